//! Segmenter: slices the source bitmap into page-sized vertical bands.
//!
//! All pagination arithmetic lives in [`SegmentPlan`], which is pure
//! geometry (no pixels), so the page count and band layout can be
//! tested without a raster backend.

use tracing::debug;

use crate::error::PaginateError;
use crate::geometry::PageGeometry;
use crate::raster::RasterBackend;

/// One rendered output segment.
///
/// Width and height are identical across all pages of a run; the final
/// segment is padded with white to the shared height before encoding.
#[derive(Debug, Clone)]
pub struct PageBitmap {
    pub width_px: u32,
    pub height_px: u32,
    /// JPEG-encoded pixels.
    pub jpeg: Vec<u8>,
}

/// One vertical band of source rows: `[y, y + capture_h)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentBand {
    pub y: u32,
    pub capture_h: u32,
}

/// Pagination arithmetic for one (source, geometry) pair.
#[derive(Debug, Clone)]
pub struct SegmentPlan {
    /// Pixels per millimeter, fixed so the source width exactly fills
    /// the printable width.
    pub scale: f64,
    /// Ideal source rows per page (real-valued).
    pub segment_height_px: f64,
    /// Canvas width of every page bitmap (= source width).
    pub page_width_px: u32,
    /// Canvas height of every page bitmap (= ceil(segment_height_px)).
    pub page_height_px: u32,
    pub total_pages: u32,
    /// Row cut points: `cuts[0] == 0`, `cuts[total_pages] == H`,
    /// strictly increasing.
    cuts: Vec<u32>,
}

impl SegmentPlan {
    /// Compute the band layout for a `width_px` x `height_px` source.
    ///
    /// 1. Resolve the printable area in mm (orientation swap, margins).
    /// 2. `scale = width_px / printable_width_mm`; the source width
    ///    always fills the printable width exactly.
    /// 3. `segment_height_px = printable_height_mm * scale`, constant
    ///    across pages.
    /// 4. `total_pages = ceil(height_px / segment_height_px)`.
    /// 5. Integer cut points `round(i * segment_height_px)`, clamped so
    ///    every band keeps at least one row and the last cut is exactly
    ///    `height_px`, so no source row is lost or duplicated.
    pub fn compute(
        width_px: u32,
        height_px: u32,
        geometry: &PageGeometry,
    ) -> Result<SegmentPlan, PaginateError> {
        let (printable_w_mm, printable_h_mm) = geometry.printable_mm()?;

        if height_px == 0 || width_px == 0 {
            return Err(PaginateError::ImageTooSmall(format!(
                "Source is {}x{} px",
                width_px, height_px
            )));
        }

        let scale = f64::from(width_px) / printable_w_mm;
        let segment_height_px = printable_h_mm * scale;
        if segment_height_px < 1.0 {
            return Err(PaginateError::InvalidGeometry(format!(
                "Printable area maps to a sub-pixel segment height ({:.3} px)",
                segment_height_px
            )));
        }

        let total_pages = (f64::from(height_px) / segment_height_px).ceil() as u32;

        // Cut points from the real-valued segment height. Each band must
        // keep >= 1 row, so cut i never exceeds H - (remaining bands).
        let mut cuts = Vec::with_capacity(total_pages as usize + 1);
        cuts.push(0u32);
        for i in 1..total_pages {
            let ideal = (f64::from(i) * segment_height_px).round() as u32;
            cuts.push(ideal.min(height_px - (total_pages - i)));
        }
        cuts.push(height_px);

        Ok(SegmentPlan {
            scale,
            segment_height_px,
            page_width_px: width_px,
            page_height_px: segment_height_px.ceil() as u32,
            total_pages,
            cuts,
        })
    }

    /// Bands in page order; the last may be shorter than a full segment.
    pub fn bands(&self) -> impl Iterator<Item = SegmentBand> + '_ {
        self.cuts.windows(2).map(|pair| SegmentBand {
            y: pair[0],
            capture_h: pair[1] - pair[0],
        })
    }
}

/// Slice a source bitmap into an ordered sequence of page bitmaps.
///
/// Every returned bitmap has the plan's fixed pixel footprint; the
/// final band is padded below with white rather than emitted short, so
/// assembly never special-cases the last page. A single encode failure
/// fails the whole run, since a document with missing pages is worse than
/// no document.
pub fn segment<R: RasterBackend>(
    backend: &R,
    source: &R::Bitmap,
    geometry: &PageGeometry,
) -> Result<Vec<PageBitmap>, PaginateError> {
    let (width_px, height_px) = backend.dimensions(source);
    let plan = SegmentPlan::compute(width_px, height_px, geometry)?;

    debug!(
        width_px,
        height_px,
        total_pages = plan.total_pages,
        segment_height_px = plan.segment_height_px,
        "Computed segment plan"
    );

    let mut pages = Vec::with_capacity(plan.total_pages as usize);
    for band in plan.bands() {
        let slice = backend.crop(source, 0, band.y, plan.page_width_px, band.capture_h);
        let slice = backend.pad_to_height(slice, plan.page_height_px);
        let jpeg = backend.encode(&slice, geometry.quality)?;
        pages.push(PageBitmap {
            width_px: plan.page_width_px,
            height_px: plan.page_height_px,
            jpeg,
        });
    }

    Ok(pages)
}
