#![allow(dead_code)]

use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId};

fn resolve<'a>(doc: &'a LopdfDocument, object: &'a Object) -> Option<&'a Object> {
    match object {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

fn number(object: &Object) -> Option<f32> {
    match object {
        Object::Integer(v) => Some(*v as f32),
        Object::Real(v) => Some(*v),
        _ => None,
    }
}

pub fn page_id(doc: &LopdfDocument, page_number: u32) -> ObjectId {
    *doc.get_pages()
        .get(&page_number)
        .unwrap_or_else(|| panic!("page {} missing", page_number))
}

pub fn page_dict(doc: &LopdfDocument, page_number: u32) -> &Dictionary {
    doc.get_dictionary(page_id(doc, page_number))
        .expect("page dictionary")
}

/// Width and height of the page's MediaBox.
pub fn page_size(doc: &LopdfDocument, page_number: u32) -> (f32, f32) {
    let media_box = page_dict(doc, page_number)
        .get(b"MediaBox")
        .ok()
        .and_then(|obj| resolve(doc, obj))
        .and_then(|obj| obj.as_array().ok())
        .expect("MediaBox");
    let values: Vec<f32> = media_box.iter().filter_map(number).collect();
    (values[2] - values[0], values[3] - values[1])
}

/// Decompressed content of the page, all streams concatenated.
pub fn page_content(doc: &LopdfDocument, page_number: u32) -> String {
    let bytes = doc
        .get_page_content(page_id(doc, page_number))
        .expect("page content");
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Names in one category of the page's resource dictionary.
pub fn resource_names(doc: &LopdfDocument, page_number: u32, category: &str) -> Vec<String> {
    page_dict(doc, page_number)
        .get(b"Resources")
        .ok()
        .and_then(|obj| resolve(doc, obj))
        .and_then(|obj| obj.as_dict().ok())
        .and_then(|resources| resources.get(category.as_bytes()).ok())
        .and_then(|obj| resolve(doc, obj))
        .and_then(|obj| obj.as_dict().ok())
        .map(|dict| {
            dict.iter()
                .map(|(name, _)| String::from_utf8_lossy(name).into_owned())
                .collect()
        })
        .unwrap_or_default()
}

/// The named image XObject on a page.
pub fn page_image<'a>(doc: &'a LopdfDocument, page_number: u32, name: &str) -> &'a Dictionary {
    let resources = page_dict(doc, page_number)
        .get(b"Resources")
        .ok()
        .and_then(|obj| resolve(doc, obj))
        .and_then(|obj| obj.as_dict().ok())
        .expect("Resources");
    let xobjects = resources
        .get(b"XObject")
        .ok()
        .and_then(|obj| resolve(doc, obj))
        .and_then(|obj| obj.as_dict().ok())
        .expect("XObject resources");
    xobjects
        .get(name.as_bytes())
        .ok()
        .and_then(|obj| resolve(doc, obj))
        .and_then(|obj| obj.as_stream().ok())
        .map(|stream| &stream.dict)
        .unwrap_or_else(|| panic!("image {} missing", name))
}

/// A text entry of the document Info dictionary.
pub fn info_entry(doc: &LopdfDocument, key: &str) -> Option<String> {
    let info = doc
        .trailer
        .get(b"Info")
        .ok()
        .and_then(|obj| resolve(doc, obj))
        .and_then(|obj| obj.as_dict().ok())?;
    match info.get(key.as_bytes()).ok()? {
        Object::String(bytes, _) => Some(String::from_utf8_lossy(bytes).into_owned()),
        _ => None,
    }
}

// ============================================================================
// Fluent Assertion Macros
// ============================================================================

/// Assert the number of pages
#[macro_export]
macro_rules! assert_pdf_page_count {
    ($pdf:expr, $count:expr) => {
        assert_eq!(
            $pdf.page_count(),
            $count,
            "Expected {} pages, got {}",
            $count,
            $pdf.page_count()
        );
    };
}

/// Assert that a page's content stream contains an operator sequence or text
#[macro_export]
macro_rules! assert_page_content_contains {
    ($pdf:expr, $page:expr, $needle:expr) => {
        let content = $crate::common::pdf_assertions::page_content(&$pdf.doc, $page);
        assert!(
            content.contains($needle),
            "Page {} should contain '{}', but content was:\n{}",
            $page,
            $needle,
            content
        );
    };
}
