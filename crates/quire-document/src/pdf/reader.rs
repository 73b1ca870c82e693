// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF reader: a `PageSource` over an in-memory document parsed with `lopdf`.

use lopdf::content::Content;
use lopdf::{Dictionary, Document, Object, ObjectId};
use quire_core::error::{QuireError, Result};
use quire_core::types::{PixelBuffer, TextFragment};
use tracing::{debug, info, instrument, warn};

use super::raster;
use super::text_layer::fragments_from_operations;
use crate::extract::engine::PageSource;

/// Page-tree depth past which inherited attribute lookup gives up.
const MAX_TREE_DEPTH: usize = 64;

/// US Letter, used when a page has no usable MediaBox.
pub const DEFAULT_MEDIA_BOX: (f32, f32) = (612.0, 792.0);

/// A parsed PDF whose pages can be read for text or rasterised.
///
/// Dropping the value releases the parsed document.
pub struct LopdfSource {
    document: Document,
    /// Page object ids in page order.
    page_ids: Vec<ObjectId>,
}

impl LopdfSource {
    // -- Construction ---------------------------------------------------------

    /// Parse PDF bytes already in memory. Corrupt and encrypted documents are
    /// rejected as load errors.
    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let document = Document::load_mem(data)
            .map_err(|err| QuireError::Load(format!("failed to parse PDF: {err}")))?;

        if document.is_encrypted() {
            warn!("Rejecting encrypted PDF");
            return Err(QuireError::Load(
                "document is encrypted and cannot be read without a password".into(),
            ));
        }

        let page_ids: Vec<ObjectId> = document.get_pages().into_values().collect();
        info!(pages = page_ids.len(), "PDF loaded from bytes");

        Ok(Self { document, page_ids })
    }

    // -- Inspection -----------------------------------------------------------

    pub fn document(&self) -> &Document {
        &self.document
    }

    fn page_id(&self, page_index: usize) -> Result<ObjectId> {
        self.page_ids.get(page_index).copied().ok_or_else(|| {
            QuireError::Load(format!(
                "page {} out of range (document has {} pages)",
                page_index + 1,
                self.page_ids.len()
            ))
        })
    }

    /// Width and height of a page's MediaBox in points, with Letter as the
    /// fallback for a missing or malformed box.
    pub fn media_box(&self, page_index: usize) -> Result<(f32, f32)> {
        let page_id = self.page_id(page_index)?;
        Ok(media_box(&self.document, page_id))
    }
}

impl PageSource for LopdfSource {
    fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    #[instrument(skip(self), fields(page = page_index + 1))]
    fn text_content(&self, page_index: usize) -> Result<Vec<TextFragment>> {
        let page_id = self
            .page_id(page_index)
            .map_err(|err| QuireError::Render(err.to_string()))?;

        let bytes = self.document.get_page_content(page_id).map_err(|err| {
            QuireError::Render(format!(
                "cannot read content stream of page {}: {err}",
                page_index + 1
            ))
        })?;
        let content = Content::decode(&bytes).map_err(|err| {
            QuireError::Render(format!(
                "cannot decode content stream of page {}: {err}",
                page_index + 1
            ))
        })?;

        let fragments = fragments_from_operations(&content.operations, page_index);
        debug!(
            operations = content.operations.len(),
            fragments = fragments.len(),
            "Text layer read"
        );
        Ok(fragments)
    }

    #[instrument(skip(self), fields(page = page_index + 1, scale))]
    fn render(&self, page_index: usize, scale: f32) -> Result<PixelBuffer> {
        let page_id = self
            .page_id(page_index)
            .map_err(|err| QuireError::Render(err.to_string()))?;
        raster::render_page(&self.document, page_id, page_index, scale)
    }

    fn has_raster_content(&self, page_index: usize) -> Result<bool> {
        let page_id = self
            .page_id(page_index)
            .map_err(|err| QuireError::Render(err.to_string()))?;
        Ok(raster::has_page_image(&self.document, page_id))
    }
}

// -- Object helpers -----------------------------------------------------------

/// Follow a single indirect reference.
pub(crate) fn resolve<'a>(document: &'a Document, object: &'a Object) -> Option<&'a Object> {
    match object {
        Object::Reference(id) => document.get_object(*id).ok(),
        other => Some(other),
    }
}

/// Resolve `object` to a dictionary, following one reference.
pub(crate) fn resolve_dict<'a>(
    document: &'a Document,
    object: &'a Object,
) -> Option<&'a Dictionary> {
    match resolve(document, object)? {
        Object::Dictionary(dict) => Some(dict),
        _ => None,
    }
}

/// Look `key` up on the page and then on its ancestors in the page tree.
pub(crate) fn inherited<'a>(
    document: &'a Document,
    page_id: ObjectId,
    key: &[u8],
) -> Option<&'a Object> {
    let mut node_id = page_id;
    for _ in 0..MAX_TREE_DEPTH {
        let node = document.get_dictionary(node_id).ok()?;
        if let Ok(value) = node.get(key) {
            return resolve(document, value);
        }
        node_id = node.get(b"Parent").ok()?.as_reference().ok()?;
    }
    None
}

pub(crate) fn media_box(document: &Document, page_id: ObjectId) -> (f32, f32) {
    let corners: Option<Vec<f32>> = inherited(document, page_id, b"MediaBox")
        .and_then(|object| object.as_array().ok())
        .map(|items| {
            items
                .iter()
                .filter_map(|item| resolve(document, item)?.as_float().ok())
                .collect()
        });

    match corners.as_deref() {
        Some([x0, y0, x1, y1]) if (x1 - x0).abs() > 0.0 && (y1 - y0).abs() > 0.0 => {
            ((x1 - x0).abs(), (y1 - y0).abs())
        }
        _ => DEFAULT_MEDIA_BOX,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use lopdf::content::Operation;
    use lopdf::{Stream, dictionary};

    /// Build a PDF whose page-tree root carries the shared resources and a
    /// 100x200 MediaBox. Each entry of `pages` becomes one page.
    pub(crate) fn build_pdf(pages: Vec<Vec<Operation>>, image: Option<Stream>) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });

        let mut xobjects = Dictionary::new();
        if let Some(image) = image {
            let image_id = doc.add_object(image);
            xobjects.set("Im1", image_id);
        }
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
            "XObject" => xobjects,
        });

        let mut kids: Vec<Object> = Vec::new();
        for operations in pages {
            let bytes = Content { operations }.encode().expect("encode content");
            let content_id = doc.add_object(Stream::new(dictionary! {}, bytes));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 100.into(), 200.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut out = Vec::new();
        doc.save_to(&mut out).expect("save pdf");
        out
    }

    pub(crate) fn text_page(lines: &[&str]) -> Vec<Operation> {
        let mut ops = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
            Operation::new("TL", vec![14.into()]),
            Operation::new("Td", vec![10.into(), 180.into()]),
        ];
        for line in lines {
            ops.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
            ops.push(Operation::new("T*", vec![]));
        }
        ops.push(Operation::new("ET", vec![]));
        ops
    }

    #[test]
    fn pages_are_counted_in_order() {
        let bytes = build_pdf(vec![text_page(&["one"]), text_page(&["two"])], None);
        let source = LopdfSource::from_bytes(&bytes).expect("load");
        assert_eq!(source.page_count(), 2);
        assert_eq!(source.text_content(1).expect("text")[0].text, "two");
    }

    #[test]
    fn text_fragments_carry_positions() {
        let bytes = build_pdf(vec![text_page(&["Hello", "World"])], None);
        let source = LopdfSource::from_bytes(&bytes).expect("load");
        let fragments = source.text_content(0).expect("text");
        assert_eq!(fragments.len(), 2);
        assert_eq!((fragments[0].x, fragments[0].y_baseline), (10.0, 180.0));
        assert_eq!((fragments[1].x, fragments[1].y_baseline), (10.0, 166.0));
    }

    #[test]
    fn media_box_is_inherited_from_page_tree() {
        let bytes = build_pdf(vec![text_page(&[])], None);
        let source = LopdfSource::from_bytes(&bytes).expect("load");
        assert_eq!(source.media_box(0).expect("box"), (100.0, 200.0));
    }

    #[test]
    fn garbage_is_a_load_error() {
        let err = LopdfSource::from_bytes(b"not a pdf at all").err().expect("must fail");
        assert!(matches!(err, QuireError::Load(_)));
    }

    #[test]
    fn unreadable_pages_are_render_errors() {
        let bytes = build_pdf(vec![text_page(&["x"])], None);
        let source = LopdfSource::from_bytes(&bytes).expect("load");
        let err = source.text_content(5).expect_err("must fail");
        assert!(matches!(err, QuireError::Render(_)));
        assert_eq!(err.stage(), quire_core::error::Stage::Render);
        assert!(matches!(source.render(5, 2.0), Err(QuireError::Render(_))));
        assert!(source.has_raster_content(5).is_err());
    }
}
