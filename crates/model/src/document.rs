use crate::content::{Content, FileType, PageMetadata};
use crate::error::DocumentError;
use crate::ink::Drawing;
use crate::pagedata::{read_pagedata, write_pagedata, BLANK_TEMPLATE};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::io::{self, BufRead, Write};
use std::sync::Arc;

/// Read access to one notebook, supplied by whatever decoded it.
///
/// Implementations are immutable snapshots; a renderer only queries them.
pub trait Document: Send + Sync {
    fn id(&self) -> &str;

    fn file_type(&self) -> FileType;

    /// Page IDs in display order.
    fn pages(&self) -> &[String];

    /// The decoded ink for a page. Unknown IDs yield [`DocumentError::PageNotFound`].
    fn drawing(&self, page_id: &str) -> Result<Arc<Drawing>, DocumentError>;

    /// Display name.
    fn name(&self) -> &str;

    fn last_modified(&self) -> DateTime<Utc>;

    fn version(&self) -> u32;

    /// The `.content` description. Defaults to one built from [`Document::pages`].
    fn content(&self) -> Content {
        let mut content = Content::new(self.file_type());
        for page in self.pages() {
            content.push_page(page.clone());
        }
        content
    }

    /// Background template selected for a page, if any.
    fn page_template(&self, _page_id: &str) -> Option<String> {
        None
    }

    /// Layer metadata stored next to a page, if the source carries it.
    fn page_metadata(&self, _page_id: &str) -> Option<PageMetadata> {
        None
    }

    /// Bytes of the imported PDF for [`FileType::Pdf`] documents.
    fn source_pdf(&self) -> Result<Arc<Vec<u8>>, DocumentError> {
        Err(DocumentError::MissingSourcePdf(self.id().to_string()))
    }
}

/// A [`Document`] held entirely in memory.
#[derive(Debug, Clone)]
pub struct InMemoryDocument {
    id: String,
    name: String,
    file_type: FileType,
    pages: Vec<String>,
    drawings: HashMap<String, Arc<Drawing>>,
    templates: HashMap<String, String>,
    metadata: HashMap<String, PageMetadata>,
    content: Option<Content>,
    last_modified: DateTime<Utc>,
    version: u32,
    source_pdf: Option<Arc<Vec<u8>>>,
}

impl InMemoryDocument {
    pub fn new(id: impl Into<String>, name: impl Into<String>, file_type: FileType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            file_type,
            pages: Vec::new(),
            drawings: HashMap::new(),
            templates: HashMap::new(),
            metadata: HashMap::new(),
            content: None,
            last_modified: DateTime::<Utc>::UNIX_EPOCH,
            version: 0,
            source_pdf: None,
        }
    }

    /// Appends a page in display order.
    pub fn with_page(mut self, page_id: impl Into<String>, drawing: Drawing) -> Self {
        let page_id = page_id.into();
        self.drawings.insert(page_id.clone(), Arc::new(drawing));
        self.pages.push(page_id);
        self
    }

    pub fn with_template(
        mut self,
        page_id: impl Into<String>,
        template: impl Into<String>,
    ) -> Self {
        self.templates.insert(page_id.into(), template.into());
        self
    }

    /// Assigns templates from a `.pagedata` listing, one line per page in
    /// display order. Pages past the end of the listing keep their template.
    pub fn with_pagedata<R: BufRead>(mut self, reader: R) -> io::Result<Self> {
        let names = read_pagedata(reader)?;
        for (page, name) in self.pages.iter().zip(names) {
            self.templates.insert(page.clone(), name);
        }
        Ok(self)
    }

    /// Writes the `.pagedata` listing; pages without a template get
    /// [`BLANK_TEMPLATE`].
    pub fn write_pagedata<W: Write>(&self, writer: W) -> io::Result<()> {
        let names: Vec<String> = self
            .pages
            .iter()
            .map(|page| {
                self.templates
                    .get(page)
                    .cloned()
                    .unwrap_or_else(|| BLANK_TEMPLATE.to_string())
            })
            .collect();
        write_pagedata(&names, writer)
    }

    /// Attaches a decoded `.content` description, replacing the one derived
    /// from the page list.
    pub fn with_content(mut self, content: Content) -> Self {
        self.content = Some(content);
        self
    }

    pub fn with_page_metadata(mut self, page_id: impl Into<String>, meta: PageMetadata) -> Self {
        self.metadata.insert(page_id.into(), meta);
        self
    }

    pub fn with_source_pdf(mut self, bytes: Vec<u8>) -> Self {
        self.source_pdf = Some(Arc::new(bytes));
        self
    }

    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    pub fn with_last_modified(mut self, last_modified: DateTime<Utc>) -> Self {
        self.last_modified = last_modified;
        self
    }

    pub fn with_file_type(mut self, file_type: FileType) -> Self {
        self.file_type = file_type;
        self
    }
}

impl Document for InMemoryDocument {
    fn id(&self) -> &str {
        &self.id
    }

    fn file_type(&self) -> FileType {
        self.file_type
    }

    fn pages(&self) -> &[String] {
        &self.pages
    }

    fn drawing(&self, page_id: &str) -> Result<Arc<Drawing>, DocumentError> {
        self.drawings
            .get(page_id)
            .cloned()
            .ok_or_else(|| DocumentError::PageNotFound(page_id.to_string()))
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn last_modified(&self) -> DateTime<Utc> {
        self.last_modified
    }

    fn version(&self) -> u32 {
        self.version
    }

    fn page_template(&self, page_id: &str) -> Option<String> {
        self.templates.get(page_id).cloned()
    }

    fn content(&self) -> Content {
        match &self.content {
            Some(content) => content.clone(),
            None => {
                let mut content = Content::new(self.file_type);
                for page in &self.pages {
                    content.push_page(page.clone());
                }
                content
            }
        }
    }

    fn page_metadata(&self, page_id: &str) -> Option<PageMetadata> {
        self.metadata.get(page_id).cloned()
    }

    fn source_pdf(&self) -> Result<Arc<Vec<u8>>, DocumentError> {
        self.source_pdf
            .clone()
            .ok_or_else(|| DocumentError::MissingSourcePdf(self.id.clone()))
    }
}
