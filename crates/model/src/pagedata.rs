//! The `.pagedata` file: one background template name per page.

use std::io::{self, BufRead, Write};

/// Template name meaning "no background template".
pub const BLANK_TEMPLATE: &str = "Blank";

pub fn read_pagedata<R: BufRead>(reader: R) -> io::Result<Vec<String>> {
    reader
        .lines()
        .map(|line| line.map(|l| l.trim().to_string()))
        .collect()
}

pub fn write_pagedata<W: Write>(templates: &[String], mut writer: W) -> io::Result<()> {
    for name in templates {
        writeln!(writer, "{}", name)?;
    }
    Ok(())
}
