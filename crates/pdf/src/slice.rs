//! Page counting and page extraction
//!
//! Extraction rebuilds the document around a fresh page tree:
//! 1. Resolve each requested page number to its page object
//! 2. Copy inherited attributes down onto each kept page
//! 3. Point the kept pages at a new flat `Pages` node, in request order
//! 4. Replace the catalog so nothing else reaches the old tree
//! 5. Prune every object that is no longer reachable, then serialise
//!
//! Step 5 is what keeps unselected pages out of the output: their content
//! streams, fonts and images are dropped unless a kept page shares them.

use std::collections::HashSet;

use lopdf::{Dictionary, Document, Object, ObjectId};

use crate::PdfError;

/// Page attributes a page may inherit from its ancestors in the page tree
const INHERITABLE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Page entries that can point at other pages or document-level structures
const DETACHED_PAGE_KEYS: [&[u8]; 3] = [b"Annots", b"B", b"StructParents"];

/// Guard against cyclic `Parent` chains in malformed files
const MAX_TREE_DEPTH: usize = 64;

fn load(bytes: &[u8]) -> Result<Document, PdfError> {
    Document::load_mem(bytes).map_err(|e| PdfError::Corrupt(e.to_string()))
}

/// Count the pages of a PDF document.
///
/// A document without any page is treated as corrupt.
pub fn page_count(bytes: &[u8]) -> Result<u32, PdfError> {
    let doc = load(bytes)?;
    let count = doc.get_pages().len() as u32;
    if count == 0 {
        return Err(PdfError::Corrupt("document has no pages".to_string()));
    }
    Ok(count)
}

/// Build a new document containing exactly `pages` (1-based), in that order.
pub fn extract_pages(bytes: &[u8], pages: &[i32]) -> Result<Vec<u8>, PdfError> {
    if pages.is_empty() {
        return Err(PdfError::InvalidPageRange(
            "at least one page must be requested".to_string(),
        ));
    }

    let mut doc = load(bytes)?;
    let page_ids = doc.get_pages();
    let count = page_ids.len() as u32;

    let mut seen = HashSet::with_capacity(pages.len());
    let mut selected: Vec<ObjectId> = Vec::with_capacity(pages.len());
    for &page in pages {
        let number = u32::try_from(page)
            .ok()
            .filter(|n| (1..=count).contains(n))
            .ok_or_else(|| {
                PdfError::InvalidPageRange(format!(
                    "page {} is outside the document range 1..={}",
                    page, count
                ))
            })?;
        if !seen.insert(number) {
            return Err(PdfError::InvalidPageRange(format!(
                "page {} is requested more than once",
                page
            )));
        }
        selected.push(page_ids[&number]);
    }

    let tree_id = doc.new_object_id();
    for &page_id in &selected {
        let inherited = collect_inherited(&doc, page_id);
        let page = doc
            .get_object_mut(page_id)
            .and_then(Object::as_dict_mut)
            .map_err(|e| PdfError::Corrupt(format!("page object {:?}: {}", page_id, e)))?;
        for (key, value) in inherited {
            page.set(key, value);
        }
        for key in DETACHED_PAGE_KEYS {
            page.remove(key);
        }
        page.set("Parent", Object::Reference(tree_id));
    }

    let tree = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Count", Object::Integer(selected.len() as i64)),
        (
            "Kids",
            Object::Array(selected.iter().map(|id| Object::Reference(*id)).collect()),
        ),
    ]);
    doc.objects.insert(tree_id, Object::Dictionary(tree));

    let catalog = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(tree_id)),
    ]);
    let catalog_id = doc.add_object(catalog);
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let pruned = doc.prune_objects();
    tracing::debug!(
        kept_pages = selected.len(),
        source_pages = count,
        pruned_objects = pruned.len(),
        "Extracted pages"
    );

    doc.compress();

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| PdfError::Write(e.to_string()))?;
    Ok(buffer)
}

/// Attributes the page lacks but inherits from an ancestor node
fn collect_inherited(doc: &Document, page_id: ObjectId) -> Vec<(&'static [u8], Object)> {
    let Ok(page) = doc.get_object(page_id).and_then(Object::as_dict) else {
        return Vec::new();
    };

    INHERITABLE_KEYS
        .iter()
        .filter(|key| !page.has(key))
        .filter_map(|key| inherited_value(doc, page, key).map(|value| (*key, value)))
        .collect()
}

fn inherited_value(doc: &Document, page: &Dictionary, key: &[u8]) -> Option<Object> {
    let mut node = page;
    for _ in 0..MAX_TREE_DEPTH {
        let parent_id = node.get(b"Parent").and_then(Object::as_reference).ok()?;
        node = doc.get_object(parent_id).and_then(Object::as_dict).ok()?;
        if let Ok(value) = node.get(key) {
            return Some(value.clone());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{page_labels, sample_pdf};
    use lopdf::content::Content;

    #[test]
    fn test_page_count() {
        assert_eq!(page_count(&sample_pdf(1)).unwrap(), 1);
        assert_eq!(page_count(&sample_pdf(7)).unwrap(), 7);
    }

    #[test]
    fn test_page_count_rejects_garbage() {
        let result = page_count(b"definitely not a pdf");
        assert!(matches!(result, Err(PdfError::Corrupt(_))));
    }

    #[test]
    fn test_extract_single_page() {
        let pdf = sample_pdf(5);
        let out = extract_pages(&pdf, &[3]).unwrap();
        assert_eq!(page_count(&out).unwrap(), 1);
        assert_eq!(page_labels(&out), vec!["Page 3"]);
    }

    #[test]
    fn test_extract_preserves_requested_order() {
        let pdf = sample_pdf(5);
        let out = extract_pages(&pdf, &[5, 1, 3]).unwrap();
        assert_eq!(page_labels(&out), vec!["Page 5", "Page 1", "Page 3"]);
    }

    #[test]
    fn test_extract_all_pages_reversed() {
        let pdf = sample_pdf(4);
        let out = extract_pages(&pdf, &[4, 3, 2, 1]).unwrap();
        assert_eq!(
            page_labels(&out),
            vec!["Page 4", "Page 3", "Page 2", "Page 1"]
        );
    }

    #[test]
    fn test_extract_rejects_page_zero_and_negative() {
        let pdf = sample_pdf(3);
        assert!(matches!(
            extract_pages(&pdf, &[0]),
            Err(PdfError::InvalidPageRange(_))
        ));
        assert!(matches!(
            extract_pages(&pdf, &[1, -2]),
            Err(PdfError::InvalidPageRange(_))
        ));
    }

    #[test]
    fn test_extract_rejects_page_past_end() {
        let pdf = sample_pdf(3);
        let err = extract_pages(&pdf, &[1, 4]).unwrap_err();
        assert!(matches!(err, PdfError::InvalidPageRange(ref msg) if msg.contains("1..=3")));
    }

    #[test]
    fn test_extract_rejects_duplicates_and_empty_selection() {
        let pdf = sample_pdf(3);
        assert!(matches!(
            extract_pages(&pdf, &[2, 2]),
            Err(PdfError::InvalidPageRange(_))
        ));
        assert!(matches!(
            extract_pages(&pdf, &[]),
            Err(PdfError::InvalidPageRange(_))
        ));
    }

    #[test]
    fn test_extract_rejects_corrupt_source() {
        let result = extract_pages(b"%PDF-1.7 truncated", &[1]);
        assert!(matches!(result, Err(PdfError::Corrupt(_))));
    }

    #[test]
    fn test_extract_materialises_inherited_attributes() {
        // The fixture declares MediaBox and Resources on the page tree root only
        let pdf = sample_pdf(3);
        let out = extract_pages(&pdf, &[2]).unwrap();

        let doc = Document::load_mem(&out).unwrap();
        let page_id = *doc.get_pages().get(&1).unwrap();
        let page = doc.get_object(page_id).and_then(Object::as_dict).unwrap();
        assert!(page.has(b"MediaBox"));
        assert!(page.has(b"Resources"));
    }

    #[test]
    fn test_extract_drops_unselected_page_content() {
        let pdf = sample_pdf(6);
        let out = extract_pages(&pdf, &[2, 4]).unwrap();

        // Scan every content stream in the file, not just the reachable pages
        let doc = Document::load_mem(&out).unwrap();
        let mut labels: Vec<String> = doc
            .objects
            .values()
            .filter_map(|object| match object {
                Object::Stream(stream) => Some(stream),
                _ => None,
            })
            .filter(|stream| {
                !matches!(
                    stream.dict.get(b"Type").and_then(Object::as_name),
                    Ok(b"XRef") | Ok(b"ObjStm")
                )
            })
            .filter_map(|stream| {
                let raw = stream
                    .decompressed_content()
                    .unwrap_or_else(|_| stream.content.clone());
                Content::decode(&raw).ok()
            })
            .flat_map(|content| content.operations)
            .filter(|op| op.operator == "Tj")
            .filter_map(|op| match op.operands.first() {
                Some(Object::String(text, _)) => Some(String::from_utf8_lossy(text).into_owned()),
                _ => None,
            })
            .collect();
        labels.sort();

        assert_eq!(labels, vec!["Page 2", "Page 4"]);
    }

    #[test]
    fn test_extract_does_not_mutate_source() {
        let pdf = sample_pdf(4);
        let before = pdf.clone();
        let _ = extract_pages(&pdf, &[4, 1]).unwrap();
        assert_eq!(pdf, before);
        assert_eq!(page_count(&pdf).unwrap(), 4);
    }

    #[test]
    fn test_extracted_document_can_be_sliced_again() {
        let pdf = sample_pdf(6);
        let first = extract_pages(&pdf, &[6, 2, 4]).unwrap();
        let second = extract_pages(&first, &[3, 1]).unwrap();
        assert_eq!(page_labels(&second), vec!["Page 4", "Page 6"]);
    }
}
