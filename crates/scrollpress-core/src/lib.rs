//! Long-image pagination: slice one tall raster image into page-sized
//! segments and assemble them into a print-ready, multi-page PDF.
//!
//! Two stages, composed by [`paginate`]:
//! - [`segment`]: source bitmap + page geometry -> ordered, uniform
//!   page bitmaps (last one white-padded).
//! - [`assemble`]: page bitmaps + geometry -> PDF bytes, one image per
//!   page stretched onto the printable rectangle.
//!
//! Pixel work goes through the [`RasterBackend`] capability so the
//! pagination logic never touches a platform rendering surface;
//! [`SoftwareRaster`] is the bundled in-memory backend.

pub mod assemble;
pub mod error;
pub mod geometry;
pub mod raster;
pub mod segment;

pub use assemble::assemble;
pub use error::PaginateError;
pub use geometry::{Orientation, PageGeometry, PageSize, MAX_MARGIN_MM};
pub use raster::{RasterBackend, SoftwareRaster};
pub use segment::{segment, PageBitmap, SegmentBand, SegmentPlan};

use tracing::info;

/// Run the full pipeline: decode, segment, assemble.
///
/// Stateless and deterministic in its inputs; re-running with changed
/// geometry recomputes everything from scratch. Geometry is validated
/// before any decode or rendering work starts.
pub fn paginate<R: RasterBackend>(
    backend: &R,
    image_bytes: &[u8],
    geometry: &PageGeometry,
) -> Result<Vec<u8>, PaginateError> {
    geometry.printable_mm()?;

    let source = backend.decode(image_bytes)?;
    let (width_px, height_px) = backend.dimensions(&source);

    let pages = segment(backend, &source, geometry)?;
    info!(width_px, height_px, pages = pages.len(), "Segmented source image");

    let document = assemble(&pages, geometry)?;
    info!(bytes = document.len(), "Serialized output document");

    Ok(document)
}
