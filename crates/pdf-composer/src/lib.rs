//! Low-level PDF composition on top of lopdf.
//!
//! - Importing pages of a source document with deep object copying
//! - Isolating a page's original content in its own graphics state
//! - Overlaying extra content streams and registering image XObjects

mod error;

pub use error::ComposerError;

use flate2::Compression;
use flate2::write::ZlibEncoder;
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use std::collections::{BTreeMap, HashMap};
use std::io::Write;

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE: [&[u8]; 4] = [b"MediaBox", b"Resources", b"CropBox", b"Rotate"];

/// Copies objects from one document into another, each object at most once.
struct ObjectCopier<'a> {
    source_doc: &'a Document,
    id_map: HashMap<ObjectId, ObjectId>,
}

impl<'a> ObjectCopier<'a> {
    fn new(source_doc: &'a Document) -> Self {
        Self {
            source_doc,
            id_map: HashMap::new(),
        }
    }

    /// Deep copies `source_id` and everything it references into `target`.
    fn copy_object(
        &mut self,
        target: &mut Document,
        source_id: ObjectId,
    ) -> Result<ObjectId, lopdf::Error> {
        if let Some(target_id) = self.id_map.get(&source_id) {
            return Ok(*target_id);
        }

        // Reserve the target id before recursing so reference cycles terminate.
        let new_id = target.add_object(Object::Null);
        self.id_map.insert(source_id, new_id);

        let obj = self.source_doc.get_object(source_id)?.clone();
        let new_obj = self.remap_references(target, obj)?;
        target.objects.insert(new_id, new_obj);

        Ok(new_id)
    }

    fn remap_references(
        &mut self,
        target: &mut Document,
        obj: Object,
    ) -> Result<Object, lopdf::Error> {
        match obj {
            Object::Reference(id) => Ok(Object::Reference(self.copy_object(target, id)?)),
            Object::Array(arr) => {
                let new_arr = arr
                    .into_iter()
                    .map(|o| self.remap_references(target, o))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Object::Array(new_arr))
            }
            Object::Dictionary(dict) => {
                Ok(Object::Dictionary(self.remap_dictionary(target, dict)?))
            }
            Object::Stream(mut stream) => {
                stream.dict = self.remap_dictionary(target, stream.dict)?;
                Ok(Object::Stream(stream))
            }
            _ => Ok(obj),
        }
    }

    fn remap_dictionary(
        &mut self,
        target: &mut Document,
        mut dict: Dictionary,
    ) -> Result<Dictionary, lopdf::Error> {
        for (_, value) in dict.iter_mut() {
            *value = self.remap_references(target, value.clone())?;
        }
        Ok(dict)
    }
}

/// A page copied into the target document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImportedPage {
    pub id: ObjectId,
    /// `[x0, y0, x1, y1]` in points.
    pub media_box: [f32; 4],
}

impl ImportedPage {
    pub fn width(&self) -> f32 {
        (self.media_box[2] - self.media_box[0]).abs()
    }

    pub fn height(&self) -> f32 {
        (self.media_box[3] - self.media_box[1]).abs()
    }
}

/// Imports pages of one source document into a target document.
///
/// Objects shared between imported pages (fonts, images) are copied once.
pub struct PageImporter<'a> {
    source: &'a Document,
    pages: BTreeMap<u32, ObjectId>,
    copier: ObjectCopier<'a>,
}

impl<'a> PageImporter<'a> {
    pub fn new(source: &'a Document) -> Self {
        Self {
            source,
            pages: source.get_pages(),
            copier: ObjectCopier::new(source),
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Copies the 1-based `page_number` into `target` as a child of `parent`.
    ///
    /// Inherited attributes are resolved onto the copy, so it no longer needs
    /// the source page tree. Annotations are not carried over.
    pub fn import_page(
        &mut self,
        target: &mut Document,
        page_number: u32,
        parent: ObjectId,
    ) -> Result<ImportedPage, ComposerError> {
        let source_id = *self
            .pages
            .get(&page_number)
            .ok_or(ComposerError::PageNotFound(page_number))?;

        let mut page = self.source.get_dictionary(source_id)?.clone();
        for key in INHERITABLE {
            if !page.has(key)
                && let Some(value) = inherited_attribute(self.source, &page, key)
            {
                page.set(key, value);
            }
        }
        page.remove(b"Parent");
        page.remove(b"Annots");

        let media_box = read_rect(self.source, page.get(b"MediaBox").ok()).ok_or_else(|| {
            ComposerError::MalformedPage {
                page: source_id,
                message: "missing or invalid MediaBox".to_string(),
            }
        })?;

        let new_id = match self.copier.id_map.get(&source_id) {
            Some(id) => *id,
            None => {
                let id = target.add_object(Object::Null);
                self.copier.id_map.insert(source_id, id);
                id
            }
        };
        let mut copied = self.copier.remap_dictionary(target, page)?;
        copied.set("Parent", Object::Reference(parent));
        target.objects.insert(new_id, Object::Dictionary(copied));

        log::debug!("Imported source page {} as {:?}", page_number, new_id);
        Ok(ImportedPage {
            id: new_id,
            media_box,
        })
    }
}

/// Finds `key` on the nearest ancestor of `page` that defines it.
fn inherited_attribute(doc: &Document, page: &Dictionary, key: &[u8]) -> Option<Object> {
    let mut parent_ref = page.get(b"Parent").and_then(Object::as_reference).ok();
    // Bounded walk; a malformed tree may contain a cycle.
    for _ in 0..64 {
        let parent = doc.get_dictionary(parent_ref?).ok()?;
        if let Ok(value) = parent.get(key) {
            return Some(value.clone());
        }
        parent_ref = parent.get(b"Parent").and_then(Object::as_reference).ok();
    }
    None
}

fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

fn read_rect(doc: &Document, obj: Option<&Object>) -> Option<[f32; 4]> {
    let obj = match obj? {
        Object::Reference(id) => doc.get_object(*id).ok()?,
        other => other,
    };
    let values = obj
        .as_array()
        .ok()?
        .iter()
        .map(|o| match o {
            Object::Reference(id) => doc.get_object(*id).ok().and_then(number),
            other => number(other),
        })
        .collect::<Option<Vec<f32>>>()?;
    match values.as_slice() {
        &[x0, y0, x1, y1] => Some([x0, y0, x1, y1]),
        _ => None,
    }
}

/// Zlib-compresses `content` for a FlateDecode stream.
pub fn deflate(content: &[u8]) -> Result<Vec<u8>, ComposerError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(content)?;
    Ok(encoder.finish()?)
}

/// A FlateDecode stream over already deflated bytes.
pub fn flate_stream(mut dict: Dictionary, deflated: Vec<u8>) -> Stream {
    dict.set("Filter", "FlateDecode");
    Stream::new(dict, deflated)
}

/// A FlateDecode stream holding `content`.
pub fn compressed_stream(dict: Dictionary, content: &[u8]) -> Result<Stream, ComposerError> {
    Ok(flate_stream(dict, deflate(content)?))
}

fn page_contents(doc: &Document, page_id: ObjectId) -> Result<Vec<Object>, ComposerError> {
    let page = doc.get_dictionary(page_id)?;
    Ok(match page.get(b"Contents") {
        Ok(Object::Array(arr)) => arr.clone(),
        Ok(Object::Reference(id)) => match doc.get_object(*id)? {
            Object::Array(arr) => arr.clone(),
            _ => vec![Object::Reference(*id)],
        },
        Ok(other) => vec![other.clone()],
        Err(_) => Vec::new(),
    })
}

/// Wraps the page's existing content in `q ... Q` so its graphics state
/// cannot leak into content appended later.
pub fn isolate_content(doc: &mut Document, page_id: ObjectId) -> Result<(), ComposerError> {
    let mut contents = page_contents(doc, page_id)?;
    if contents.is_empty() {
        return Ok(());
    }

    let save_id = doc.add_object(Stream::new(dictionary! {}, b"q\n".to_vec()));
    let restore_id = doc.add_object(Stream::new(dictionary! {}, b"\nQ\n".to_vec()));
    contents.insert(0, Object::Reference(save_id));
    contents.push(Object::Reference(restore_id));

    doc.get_dictionary_mut(page_id)?
        .set("Contents", Object::Array(contents));
    Ok(())
}

/// Appends a compressed content stream to a page, drawn on top of what is
/// already there.
pub fn overlay_content(
    doc: &mut Document,
    page_id: ObjectId,
    content_stream: Vec<u8>,
) -> Result<(), ComposerError> {
    let stream = compressed_stream(dictionary! {}, &content_stream)?;
    let new_content_id = doc.add_object(Object::Stream(stream));

    let mut contents = page_contents(doc, page_id)?;
    contents.push(Object::Reference(new_content_id));
    doc.get_dictionary_mut(page_id)?
        .set("Contents", Object::Array(contents));
    Ok(())
}

/// Resolves `obj` to a dictionary the caller can modify, cloning it out of
/// the document if it was a shared reference.
fn owned_dictionary(doc: &Document, obj: Option<&Object>) -> Result<Dictionary, ComposerError> {
    Ok(match obj {
        Some(Object::Dictionary(dict)) => dict.clone(),
        Some(Object::Reference(id)) => doc.get_dictionary(*id)?.clone(),
        _ => Dictionary::new(),
    })
}

/// Adds a resource of `category` (`XObject`, `Font`, ...) to a page and
/// returns the name it is registered under.
///
/// The name starts with `prefix` and does not collide with an existing entry.
/// Shared resource dictionaries are copied into the page before modification.
pub fn register_resource(
    doc: &mut Document,
    page_id: ObjectId,
    category: &str,
    prefix: &str,
    resource: Object,
) -> Result<String, ComposerError> {
    let page = doc.get_dictionary(page_id)?;
    let current = match page.get(b"Resources") {
        Ok(obj) => Some(obj.clone()),
        Err(_) => inherited_attribute(doc, page, b"Resources"),
    };
    let mut resources = owned_dictionary(doc, current.as_ref())?;
    let mut entries = owned_dictionary(doc, resources.get(category.as_bytes()).ok())?;

    let name = (0..)
        .map(|i| format!("{}{}", prefix, i))
        .find(|candidate| !entries.has(candidate.as_bytes()))
        .unwrap_or_else(|| prefix.to_string());
    entries.set(name.as_bytes(), resource);
    resources.set(category.as_bytes(), Object::Dictionary(entries));

    doc.get_dictionary_mut(page_id)?
        .set("Resources", Object::Dictionary(resources));
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::StringFormat;

    /// A document whose pages inherit MediaBox and Resources from the page tree.
    fn create_source_pdf(num_pages: u32, text_prefix: &str) -> Document {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut page_ids = vec![];
        for i in 1..=num_pages {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 12.into()]),
                    Operation::new("Td", vec![100.into(), 700.into()]),
                    Operation::new(
                        "Tj",
                        vec![Object::String(
                            format!("{} {}", text_prefix, i).into_bytes(),
                            StringFormat::Literal,
                        )],
                    ),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            page_ids.push(page_id.into());
        }

        let pages_dict = dictionary! {
            "Type" => "Pages",
            "Kids" => page_ids,
            "Count" => num_pages as i64,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Resources" => resources_id,
        };
        doc.objects.insert(pages_id, pages_dict.into());

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        doc
    }

    fn empty_target() -> (Document, ObjectId) {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();
        (doc, pages_id)
    }

    #[test]
    fn imported_page_resolves_inherited_attributes() {
        let source = create_source_pdf(2, "Source Page");
        let (mut target, pages_id) = empty_target();
        let mut importer = PageImporter::new(&source);
        assert_eq!(importer.page_count(), 2);

        let page = importer.import_page(&mut target, 2, pages_id).unwrap();
        assert_eq!(page.media_box, [0.0, 0.0, 612.0, 792.0]);
        assert_eq!((page.width(), page.height()), (612.0, 792.0));

        let dict = target.get_dictionary(page.id).unwrap();
        assert_eq!(dict.get(b"Parent").unwrap().as_reference().unwrap(), pages_id);
        assert!(dict.has(b"Resources"));
        assert!(dict.has(b"MediaBox"));

        let content = target.get_page_content(page.id).unwrap();
        assert!(String::from_utf8_lossy(&content).contains("Source Page 2"));
    }

    #[test]
    fn shared_objects_are_copied_once() {
        let source = create_source_pdf(3, "P");
        let (mut target, pages_id) = empty_target();
        let mut importer = PageImporter::new(&source);

        let a = importer.import_page(&mut target, 1, pages_id).unwrap();
        let b = importer.import_page(&mut target, 3, pages_id).unwrap();
        let res = |id| {
            target
                .get_dictionary(id)
                .and_then(|page| page.get(b"Resources"))
                .and_then(Object::as_reference)
                .unwrap()
        };
        assert_eq!(res(a.id), res(b.id));
    }

    #[test]
    fn missing_page_is_reported() {
        let source = create_source_pdf(1, "P");
        let (mut target, pages_id) = empty_target();
        assert!(matches!(
            PageImporter::new(&source).import_page(&mut target, 4, pages_id),
            Err(ComposerError::PageNotFound(4))
        ));
    }

    #[test]
    fn isolated_content_is_bracketed() {
        let mut doc = create_source_pdf(1, "Original Content");
        let page_id = *doc.get_pages().get(&1).unwrap();

        isolate_content(&mut doc, page_id).unwrap();
        overlay_content(&mut doc, page_id, b"0 0 1 rg 0 0 10 10 re f".to_vec()).unwrap();

        let contents = doc
            .get_dictionary(page_id)
            .and_then(|page| page.get(b"Contents"))
            .and_then(Object::as_array)
            .unwrap();
        assert_eq!(contents.len(), 4);

        let full = String::from_utf8_lossy(&doc.get_page_content(page_id).unwrap()).to_string();
        let save = full.find('q').unwrap();
        let original = full.find("Original Content").unwrap();
        let restore = full.rfind('Q').unwrap();
        let overlay = full.find("re f").unwrap();
        assert!(save < original && original < restore && restore < overlay);
    }

    #[test]
    fn resources_get_unique_names_without_touching_shared_dicts() {
        let mut doc = create_source_pdf(2, "P");
        let pages = doc.get_pages();
        let (first, second) = (pages[&1], pages[&2]);
        let image = doc.add_object(dictionary! { "Type" => "XObject" });

        let register =
            |doc: &mut Document| register_resource(doc, first, "XObject", "Ink", image.into());
        let a = register(&mut doc).unwrap();
        let b = register(&mut doc).unwrap();
        assert_eq!((a.as_str(), b.as_str()), ("Ink0", "Ink1"));

        let own = doc.get_dictionary(first).unwrap().get(b"Resources").unwrap().as_dict().unwrap();
        assert!(own.has(b"Font"));
        assert_eq!(own.get(b"XObject").unwrap().as_dict().unwrap().len(), 2);

        // The second page still inherits the untouched shared dictionary.
        assert!(!doc.get_dictionary(second).unwrap().has(b"Resources"));
    }

    #[test]
    fn compressed_streams_round_trip() {
        let stream = compressed_stream(dictionary! {}, b"q 1 0 0 1 0 0 cm Q").unwrap();
        assert_eq!(stream.dict.get(b"Filter").unwrap().as_name().unwrap(), b"FlateDecode");
        assert_eq!(stream.decompressed_content().unwrap(), b"q 1 0 0 1 0 0 cm Q");
    }

    #[test]
    fn flate_stream_wraps_deflated_bytes() {
        let deflated = deflate(&[7u8; 4096]).unwrap();
        assert!(deflated.len() < 4096);
        let stream = flate_stream(dictionary! { "Type" => "XObject" }, deflated);
        assert_eq!(stream.dict.get(b"Filter").unwrap().as_name().unwrap(), b"FlateDecode");
        assert_eq!(stream.decompressed_content().unwrap(), vec![7u8; 4096]);
    }
}
