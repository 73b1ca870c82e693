// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raster fallback: produce a page bitmap for recognition from the largest
// image drawn on the page. Vector content is not rasterised; a page without
// an image renders as a blank canvas of its MediaBox size, and
// `has_page_image` lets the pipeline keep such a page's text layer instead.
// Canvas sides never exceed `MAX_DIMENSION`, whatever the scale.

use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use quire_core::error::{QuireError, Result};
use quire_core::types::PixelBuffer;
use tracing::{debug, warn};

use super::reader::{inherited, media_box, resolve, resolve_dict};
use crate::image::{ImageProcessor, SampleLayout, fit_within_max};

/// Rasterise page `page_index` at `scale` times its 72 dpi size.
pub(crate) fn render_page(
    document: &Document,
    page_id: ObjectId,
    page_index: usize,
    scale: f32,
) -> Result<PixelBuffer> {
    if !(scale.is_finite() && scale > 0.0) {
        return Err(QuireError::Render(format!("invalid render scale {scale}")));
    }

    let (width_pt, height_pt) = media_box(document, page_id);
    let (target_width, target_height) =
        fit_within_max((width_pt * scale).ceil() as u32, (height_pt * scale).ceil() as u32);

    let canvas = match largest_image(document, page_id) {
        Some(stream) => decode_image(document, stream).map_err(|err| {
            QuireError::Render(format!("page {}: {err}", page_index + 1))
        })?,
        None => {
            warn!(
                page = page_index + 1,
                "No raster image on page; vector content is not rasterised"
            );
            ImageProcessor::blank(target_width, target_height)
        }
    };

    let quarter_turns = inherited(document, page_id, b"Rotate")
        .and_then(|rotate| rotate.as_i64().ok())
        .map_or(0, |degrees| degrees / 90);

    let buffer = canvas
        .upscale_to_width(target_width)
        .grayscale()
        .normalize_contrast()
        .rotate_quarter_turns(quarter_turns)
        .into_pixel_buffer()?;

    debug!(
        width = buffer.width,
        height = buffer.height,
        png_bytes = buffer.png.len(),
        "Page rendered"
    );
    Ok(buffer)
}

/// True when the page draws at least one raster image.
pub(crate) fn has_page_image(document: &Document, page_id: ObjectId) -> bool {
    largest_image(document, page_id).is_some()
}

/// The image XObject with the most pixels, from the page's (possibly
/// inherited) resources.
fn largest_image(document: &Document, page_id: ObjectId) -> Option<&Stream> {
    let resources = inherited(document, page_id, b"Resources")?.as_dict().ok()?;
    let xobjects = resolve_dict(document, resources.get(b"XObject").ok()?)?;

    xobjects
        .iter()
        .filter_map(|(_, object)| match resolve(document, object)? {
            Object::Stream(stream) if is_image(&stream.dict) => Some(stream),
            _ => None,
        })
        .max_by_key(|stream| {
            let width = dimension(document, &stream.dict, b"Width").unwrap_or(0);
            let height = dimension(document, &stream.dict, b"Height").unwrap_or(0);
            u64::from(width) * u64::from(height)
        })
}

fn is_image(dict: &Dictionary) -> bool {
    matches!(dict.get(b"Subtype"), Ok(Object::Name(name)) if name == b"Image")
        && !matches!(dict.get(b"ImageMask"), Ok(Object::Boolean(true)))
}

fn dimension(document: &Document, dict: &Dictionary, key: &[u8]) -> Option<u32> {
    let value = resolve(document, dict.get(key).ok()?)?.as_i64().ok()?;
    u32::try_from(value).ok().filter(|v| *v > 0)
}

fn filter_names(document: &Document, dict: &Dictionary) -> Vec<Vec<u8>> {
    let Some(filter) = dict.get(b"Filter").ok().and_then(|f| resolve(document, f)) else {
        return Vec::new();
    };
    match filter {
        Object::Name(name) => vec![name.clone()],
        Object::Array(items) => items
            .iter()
            .filter_map(|item| match resolve(document, item)? {
                Object::Name(name) => Some(name.clone()),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn decode_image(document: &Document, stream: &Stream) -> Result<ImageProcessor> {
    let dict = &stream.dict;
    let filters = filter_names(document, dict);

    let samples = match filters.as_slice() {
        [] => stream.content.clone(),
        [only] if only.as_slice() == b"DCTDecode" => {
            return ImageProcessor::from_bytes(&stream.content);
        }
        [only] if only.as_slice() == b"FlateDecode" => stream
            .decompressed_content()
            .map_err(|err| QuireError::Image(format!("cannot inflate image data: {err}")))?,
        other => {
            let names: Vec<String> = other
                .iter()
                .map(|name| String::from_utf8_lossy(name).into_owned())
                .collect();
            return Err(QuireError::Image(format!(
                "unsupported image filter chain [{}]",
                names.join(", ")
            )));
        }
    };

    let width = dimension(document, dict, b"Width")
        .ok_or_else(|| QuireError::Image("image has no usable /Width".into()))?;
    let height = dimension(document, dict, b"Height")
        .ok_or_else(|| QuireError::Image("image has no usable /Height".into()))?;
    let layout = color_layout(document, dict)?;
    let bits = dict
        .get(b"BitsPerComponent")
        .ok()
        .and_then(|b| resolve(document, b)?.as_i64().ok())
        .unwrap_or(8);

    match (bits, layout) {
        (8, layout) => ImageProcessor::from_samples(width, height, layout, samples),
        (1, SampleLayout::Gray) => {
            let expanded = expand_one_bit_rows(width, height, &samples)?;
            ImageProcessor::from_samples(width, height, SampleLayout::Gray, expanded)
        }
        (bits, layout) => Err(QuireError::Image(format!(
            "unsupported {bits}-bit {layout:?} image"
        ))),
    }
}

fn color_layout(document: &Document, dict: &Dictionary) -> Result<SampleLayout> {
    let space = dict
        .get(b"ColorSpace")
        .ok()
        .and_then(|space| resolve(document, space))
        .ok_or_else(|| QuireError::Image("image has no /ColorSpace".into()))?;

    let components = match space {
        Object::Name(name) => match name.as_slice() {
            b"DeviceGray" | b"CalGray" | b"G" => Some(1),
            b"DeviceRGB" | b"CalRGB" | b"RGB" => Some(3),
            b"DeviceCMYK" | b"CMYK" => Some(4),
            _ => None,
        },
        Object::Array(items) => match items.as_slice() {
            [Object::Name(family), profile, ..] if family == b"ICCBased" => {
                match resolve(document, profile) {
                    Some(Object::Stream(icc)) => icc
                        .dict
                        .get(b"N")
                        .ok()
                        .and_then(|n| n.as_i64().ok())
                        .and_then(|n| usize::try_from(n).ok()),
                    _ => None,
                }
            }
            [Object::Name(family), ..] if family == b"CalGray" => Some(1),
            [Object::Name(family), ..] if family == b"CalRGB" => Some(3),
            _ => None,
        },
        _ => None,
    };

    components
        .and_then(SampleLayout::from_components)
        .ok_or_else(|| QuireError::Image(format!("unsupported image colour space {space:?}")))
}

/// Expand packed 1-bit rows (each padded to a whole byte) into 8-bit luma
/// with 0 as black.
fn expand_one_bit_rows(width: u32, height: u32, packed: &[u8]) -> Result<Vec<u8>> {
    let stride = (width as usize).div_ceil(8);
    let needed = stride * height as usize;
    if packed.len() < needed {
        return Err(QuireError::Image(format!(
            "1-bit {width}x{height} image needs {needed} bytes, got {}",
            packed.len()
        )));
    }

    let mut out = Vec::with_capacity(width as usize * height as usize);
    for row in packed.chunks_exact(stride).take(height as usize) {
        for x in 0..width as usize {
            let bit = (row[x / 8] >> (7 - x % 8)) & 1;
            out.push(if bit == 1 { 255 } else { 0 });
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::engine::PageSource;
    use crate::pdf::reader::LopdfSource;
    use crate::pdf::reader::tests::{build_pdf, text_page};
    use lopdf::dictionary;

    fn gray_image(width: i64, height: i64, samples: Vec<u8>) -> Stream {
        Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => width,
                "Height" => height,
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => 8_i64,
            },
            samples,
        )
    }

    #[test]
    fn embedded_image_is_upscaled_to_page_width() {
        let image = gray_image(4, 2, vec![0, 255, 0, 255, 255, 0, 255, 0]);
        let bytes = build_pdf(vec![text_page(&[])], Some(image));
        let source = LopdfSource::from_bytes(&bytes).expect("load");

        // 100pt wide page at scale 2 needs at least 200 px.
        let buffer = source.render(0, 2.0).expect("render");
        assert_eq!((buffer.width, buffer.height), (200, 100));
        assert_eq!(&buffer.png[..4], b"\x89PNG");
    }

    #[test]
    fn huge_scale_is_capped_without_distortion() {
        let bytes = build_pdf(vec![text_page(&[])], None);
        let source = LopdfSource::from_bytes(&bytes).expect("load");
        // 100x200pt at scale 60 asks for 6000x12000.
        let buffer = source.render(0, 60.0).expect("render");
        assert_eq!((buffer.width, buffer.height), (5_000, 10_000));
    }

    #[test]
    fn image_detection_follows_resources() {
        let with_image = build_pdf(vec![text_page(&[])], Some(gray_image(1, 1, vec![0])));
        let without = build_pdf(vec![text_page(&["Chapter One"])], None);
        let with_image = LopdfSource::from_bytes(&with_image).expect("load");
        let without = LopdfSource::from_bytes(&without).expect("load");
        assert!(with_image.has_raster_content(0).expect("inspect"));
        assert!(!without.has_raster_content(0).expect("inspect"));
    }

    #[test]
    fn page_without_image_renders_blank_canvas() {
        let bytes = build_pdf(vec![text_page(&["short"])], None);
        let source = LopdfSource::from_bytes(&bytes).expect("load");
        let buffer = source.render(0, 2.0).expect("render");
        assert_eq!((buffer.width, buffer.height), (200, 400));
    }

    #[test]
    fn undecodable_image_is_a_render_error() {
        let mut image = gray_image(4, 4, vec![0; 4]);
        image.dict.set("Filter", "JBIG2Decode");
        let bytes = build_pdf(vec![text_page(&[])], Some(image));
        let source = LopdfSource::from_bytes(&bytes).expect("load");
        assert!(matches!(source.render(0, 2.0), Err(QuireError::Render(_))));
    }

    #[test]
    fn invalid_scale_is_rejected() {
        let bytes = build_pdf(vec![text_page(&[])], None);
        let source = LopdfSource::from_bytes(&bytes).expect("load");
        assert!(matches!(source.render(0, 0.0), Err(QuireError::Render(_))));
    }

    #[test]
    fn one_bit_rows_expand_with_padding() {
        // Width 3: each row is one byte, high bits first.
        let expanded = expand_one_bit_rows(3, 2, &[0b1010_0000, 0b0110_0000]).expect("expand");
        assert_eq!(expanded, vec![255, 0, 255, 0, 255, 255]);
    }

    #[test]
    fn short_one_bit_data_is_rejected() {
        assert!(expand_one_bit_rows(16, 2, &[0xFF]).is_err());
    }
}
