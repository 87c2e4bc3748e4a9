//! Assembler: builds the multi-page PDF from rendered page bitmaps.
//!
//! Each page gets one image XObject carrying the bitmap's JPEG payload
//! as-is (`/Filter /DCTDecode`, no re-encode) plus a content stream
//! that maps it onto the printable rectangle. Page dimensions come
//! from the same geometry the segmenter used, so the stretch-to-fit
//! placement preserves the segment's aspect ratio.

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, Stream};
use tracing::debug;

use crate::error::PaginateError;
use crate::geometry::PageGeometry;
use crate::segment::PageBitmap;

/// PDF points per millimeter.
const PT_PER_MM: f64 = 72.0 / 25.4;

/// Assemble page bitmaps, in order, into a single PDF byte buffer.
///
/// One input bitmap becomes exactly one output page. The physical page
/// size is the oriented geometry in PDF points; every bitmap is drawn
/// at `(margin, margin)` stretched to exactly fill the printable
/// rectangle. Fails with [`PaginateError::EmptyInput`] on an empty
/// slice rather than emitting a zero-page document.
pub fn assemble(
    page_bitmaps: &[PageBitmap],
    geometry: &PageGeometry,
) -> Result<Vec<u8>, PaginateError> {
    if page_bitmaps.is_empty() {
        return Err(PaginateError::EmptyInput);
    }

    let (printable_w_mm, printable_h_mm) = geometry.printable_mm()?;
    let (page_w_mm, page_h_mm) = geometry.oriented_mm();

    let page_w_pt = page_w_mm * PT_PER_MM;
    let page_h_pt = page_h_mm * PT_PER_MM;
    let margin_pt = geometry.margin_mm * PT_PER_MM;
    let printable_w_pt = printable_w_mm * PT_PER_MM;
    let printable_h_pt = printable_h_mm * PT_PER_MM;

    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let mut page_ids = Vec::with_capacity(page_bitmaps.len());
    for bitmap in page_bitmaps {
        let image_id = doc.add_object(image_xobject(bitmap));

        // PDF origin is bottom-left; the unit image square is scaled to
        // the printable rectangle and offset by the margin.
        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![
                        Object::Real(printable_w_pt as f32),
                        Object::Real(0.0),
                        Object::Real(0.0),
                        Object::Real(printable_h_pt as f32),
                        Object::Real(margin_pt as f32),
                        Object::Real(margin_pt as f32),
                    ],
                ),
                Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
                Operation::new("Q", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(
            Dictionary::new(),
            content
                .encode()
                .map_err(|e| PaginateError::Document(e.to_string()))?,
        ));

        let mut xobjects = Dictionary::new();
        xobjects.set("Im0", Object::Reference(image_id));
        let mut resources = Dictionary::new();
        resources.set("XObject", Object::Dictionary(xobjects));

        let page = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Real(page_w_pt as f32),
                    Object::Real(page_h_pt as f32),
                ]),
            ),
            ("Contents", Object::Reference(content_id)),
            ("Resources", Object::Dictionary(resources)),
        ]);
        page_ids.push(doc.add_object(page));
    }

    let pages = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Count", Object::Integer(page_ids.len() as i64)),
        (
            "Kids",
            Object::Array(page_ids.iter().map(|id| Object::Reference(*id)).collect()),
        ),
    ]);
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]);
    let catalog_id = doc.add_object(catalog);
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let info = Dictionary::from_iter(vec![(
        "Producer",
        Object::string_literal("scrollpress"),
    )]);
    let info_id = doc.add_object(info);
    doc.trailer.set("Info", Object::Reference(info_id));

    // Image streams already carry DCTDecode and are left alone.
    doc.compress();

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| PaginateError::Document(format!("Save failed: {}", e)))?;

    debug!(
        pages = page_bitmaps.len(),
        bytes = buffer.len(),
        "Assembled output document"
    );

    Ok(buffer)
}

/// Image XObject wrapping the bitmap's JPEG payload untouched.
fn image_xobject(bitmap: &PageBitmap) -> Stream {
    let mut dict = Dictionary::new();
    dict.set("Type", Object::Name(b"XObject".to_vec()));
    dict.set("Subtype", Object::Name(b"Image".to_vec()));
    dict.set("Width", Object::Integer(i64::from(bitmap.width_px)));
    dict.set("Height", Object::Integer(i64::from(bitmap.height_px)));
    dict.set("ColorSpace", Object::Name(b"DeviceRGB".to_vec()));
    dict.set("BitsPerComponent", Object::Integer(8));
    dict.set("Filter", Object::Name(b"DCTDecode".to_vec()));
    Stream::new(dict, bitmap.jpeg.clone())
}
