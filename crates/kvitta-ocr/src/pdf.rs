//! Per-page image extraction from scanned receipt PDFs.
//!
//! Receipt PDFs are almost always scanner output: each page is a single
//! full-page image XObject. We pull that image out per page and hand it to
//! the OCR service — JPEG streams (`DCTDecode`) pass through untouched,
//! raw RGB/grayscale rasters are re-encoded as PNG. Pages without a usable
//! image are reported with `image: None` so the caller can substitute its
//! no-text sentinel instead of failing the document.

use std::io::Cursor;

use image::{DynamicImage, GrayImage, RgbImage};
use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::debug;

use crate::OcrError;

/// One PDF page and the scan image found on it, if any.
pub struct PdfPage {
    /// 1-indexed page number.
    pub number: u32,
    /// JPEG or PNG bytes ready for OCR.
    pub image: Option<Vec<u8>>,
}

/// Extract the scan image of every page, in page order.
pub fn extract_page_images(data: &[u8]) -> Result<Vec<PdfPage>, OcrError> {
    let mut doc = Document::load_mem(data).map_err(|e| OcrError::Pdf(e.to_string()))?;

    if doc.is_encrypted() {
        // Scanner apps sometimes emit empty-password encryption.
        doc.decrypt("")
            .map_err(|_| OcrError::Pdf("encrypted document".to_string()))?;
    }

    let pages = doc.get_pages();
    if pages.is_empty() {
        return Err(OcrError::Pdf("document has no pages".to_string()));
    }

    let mut out = Vec::with_capacity(pages.len());
    for (&number, &page_id) in &pages {
        let image = first_page_image(&doc, page_id);
        debug!(page = number, found = image.is_some(), "pdf page scanned");
        out.push(PdfPage { number, image });
    }
    Ok(out)
}

/// First decodable image XObject in the page's resources.
fn first_page_image(doc: &Document, page_id: ObjectId) -> Option<Vec<u8>> {
    let resources = page_resources(doc, page_id)?;
    let (_, xobjects) = doc.dereference(resources.get(b"XObject").ok()?).ok()?;
    let Object::Dictionary(xobjects) = xobjects else {
        return None;
    };

    for (_name, entry) in xobjects.iter() {
        if let Ok((_, object)) = doc.dereference(entry) {
            if let Some(bytes) = decode_image_stream(object) {
                return Some(bytes);
            }
        }
    }
    None
}

/// Page `Resources`, walking up the page-tree `Parent` chain when inherited.
fn page_resources(doc: &Document, node_id: ObjectId) -> Option<Dictionary> {
    let Ok(Object::Dictionary(dict)) = doc.get_object(node_id) else {
        return None;
    };

    if let Ok(resources) = dict.get(b"Resources") {
        if let Ok((_, Object::Dictionary(resources))) = doc.dereference(resources) {
            return Some(resources.clone());
        }
    }

    match dict.get(b"Parent") {
        Ok(Object::Reference(parent_id)) => page_resources(doc, *parent_id),
        _ => None,
    }
}

/// Decode an image XObject stream into OCR-ready bytes.
fn decode_image_stream(object: &Object) -> Option<Vec<u8>> {
    let Object::Stream(stream) = object else {
        return None;
    };
    let dict = &stream.dict;
    if dict.get(b"Subtype").ok()?.as_name().ok()? != b"Image" {
        return None;
    }

    let filter = dict.get(b"Filter").ok().and_then(|f| match f {
        Object::Name(name) => Some(name.as_slice()),
        Object::Array(arr) => arr.first().and_then(|o| o.as_name().ok()),
        _ => None,
    });

    match filter {
        // Embedded JPEG — the OCR service accepts it as-is.
        Some(b"DCTDecode") => Some(stream.content.clone()),
        // JPEG2000 / fax encodings are not worth decoding for receipts.
        Some(b"JPXDecode") | Some(b"CCITTFaxDecode") | Some(b"JBIG2Decode") => None,
        _ => {
            let width = dict.get(b"Width").ok()?.as_i64().ok()? as u32;
            let height = dict.get(b"Height").ok()?.as_i64().ok()? as u32;
            let bits = dict
                .get(b"BitsPerComponent")
                .ok()
                .and_then(|o| o.as_i64().ok())
                .unwrap_or(8);
            if bits != 8 {
                return None;
            }
            let data = stream
                .decompressed_content()
                .unwrap_or_else(|_| stream.content.clone());
            let color_space = dict
                .get(b"ColorSpace")
                .ok()
                .and_then(|o| match o {
                    Object::Name(name) => Some(name.as_slice()),
                    Object::Array(arr) => arr.first().and_then(|o| o.as_name().ok()),
                    _ => None,
                })
                .unwrap_or(b"DeviceRGB");
            encode_raw_raster(&data, width, height, color_space)
        }
    }
}

/// Wrap a raw RGB or grayscale raster into a PNG.
fn encode_raw_raster(data: &[u8], width: u32, height: u32, color_space: &[u8]) -> Option<Vec<u8>> {
    let dynamic = match color_space {
        b"DeviceRGB" | b"RGB" => {
            let expected = (width as usize) * (height as usize) * 3;
            if data.len() < expected {
                return None;
            }
            RgbImage::from_raw(width, height, data[..expected].to_vec())
                .map(DynamicImage::ImageRgb8)?
        }
        b"DeviceGray" | b"G" => {
            let expected = (width as usize) * (height as usize);
            if data.len() < expected {
                return None;
            }
            GrayImage::from_raw(width, height, data[..expected].to_vec())
                .map(DynamicImage::ImageLuma8)?
        }
        _ => return None,
    };

    let mut png = Vec::new();
    dynamic
        .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
        .ok()?;
    Some(png)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{dictionary, Stream};

    /// Minimal one-page PDF with no images on the page.
    fn blank_single_page_pdf() -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let content_id = doc.add_object(Stream::new(dictionary! {}, Vec::new()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buf = Vec::new();
        doc.save_to(&mut buf).unwrap();
        buf
    }

    #[test]
    fn rejects_garbage_bytes() {
        assert!(matches!(
            extract_page_images(b"not a pdf"),
            Err(OcrError::Pdf(_))
        ));
    }

    #[test]
    fn blank_page_yields_no_image() {
        let pdf = blank_single_page_pdf();
        let pages = extract_page_images(&pdf).unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].number, 1);
        assert!(pages[0].image.is_none());
    }

    #[test]
    fn raw_gray_raster_encodes_as_png() {
        let png = encode_raw_raster(&[128u8; 4], 2, 2, b"DeviceGray").unwrap();
        // PNG magic
        assert_eq!(&png[..4], &[0x89, b'P', b'N', b'G']);
    }

    #[test]
    fn short_raster_is_rejected() {
        assert!(encode_raw_raster(&[0u8; 3], 2, 2, b"DeviceRGB").is_none());
    }
}
