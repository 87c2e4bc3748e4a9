//! Page geometry: physical page sizes, orientation, and margins.
//!
//! All physical dimensions are millimeters; the printable area is the
//! oriented page minus a uniform margin on all four sides. Geometry is
//! validated up front so no rendering work starts on a page that
//! cannot hold any content.

use serde::{Deserialize, Serialize};

use crate::error::PaginateError;

/// Largest supported uniform margin, in millimeters.
pub const MAX_MARGIN_MM: f64 = 50.0;

/// Standard physical page sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageSize {
    A4,
    Letter,
    Legal,
}

impl PageSize {
    /// Portrait (width, height) in millimeters.
    pub fn dimensions_mm(self) -> (f64, f64) {
        match self {
            PageSize::A4 => (210.0, 297.0),
            PageSize::Letter => (215.9, 279.4),
            PageSize::Legal => (215.9, 355.6),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    Portrait,
    Landscape,
}

/// Page size, orientation, margin, and re-encode quality for one run.
///
/// A value object: cheap to copy, compared field-wise, never mutated by
/// the pipeline. Changing any field means a full re-run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    pub page_size: PageSize,
    pub orientation: Orientation,
    /// Uniform margin on all four sides, 0..=50 mm.
    pub margin_mm: f64,
    /// JPEG re-encode quality factor, (0, 1].
    pub quality: f32,
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self {
            page_size: PageSize::A4,
            orientation: Orientation::Portrait,
            margin_mm: 10.0,
            quality: 0.92,
        }
    }
}

impl PageGeometry {
    /// Physical (width, height) in millimeters after applying orientation.
    pub fn oriented_mm(&self) -> (f64, f64) {
        let (w, h) = self.page_size.dimensions_mm();
        match self.orientation {
            Orientation::Portrait => (w, h),
            Orientation::Landscape => (h, w),
        }
    }

    /// Printable (width, height) in millimeters: oriented page minus
    /// `2 * margin_mm` per axis.
    ///
    /// Rejects geometry whose printable area is not strictly positive,
    /// margins outside `[0, MAX_MARGIN_MM]`, and quality outside (0, 1].
    pub fn printable_mm(&self) -> Result<(f64, f64), PaginateError> {
        if !self.margin_mm.is_finite() || self.margin_mm < 0.0 || self.margin_mm > MAX_MARGIN_MM {
            return Err(PaginateError::InvalidGeometry(format!(
                "Margin {} mm outside 0..={} mm",
                self.margin_mm, MAX_MARGIN_MM
            )));
        }
        if !self.quality.is_finite() || self.quality <= 0.0 || self.quality > 1.0 {
            return Err(PaginateError::InvalidGeometry(format!(
                "Quality {} outside (0, 1]",
                self.quality
            )));
        }

        let (page_w, page_h) = self.oriented_mm();
        let printable_w = page_w - 2.0 * self.margin_mm;
        let printable_h = page_h - 2.0 * self.margin_mm;
        if printable_w <= 0.0 || printable_h <= 0.0 {
            return Err(PaginateError::InvalidGeometry(format!(
                "Margin {} mm leaves no printable area on a {}x{} mm page",
                self.margin_mm, page_w, page_h
            )));
        }

        Ok((printable_w, printable_h))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_a4_portrait_printable_area() {
        let geometry = PageGeometry::default();
        let (w, h) = geometry.printable_mm().unwrap();
        assert_eq!(w, 190.0);
        assert_eq!(h, 277.0);
    }

    #[test]
    fn test_landscape_swaps_dimensions() {
        let geometry = PageGeometry {
            orientation: Orientation::Landscape,
            ..PageGeometry::default()
        };
        let (w, h) = geometry.oriented_mm();
        assert_eq!(w, 297.0);
        assert_eq!(h, 210.0);
    }

    #[test]
    fn test_legal_max_margin_is_still_valid() {
        let geometry = PageGeometry {
            page_size: PageSize::Legal,
            margin_mm: 50.0,
            ..PageGeometry::default()
        };
        let (w, h) = geometry.printable_mm().unwrap();
        assert!((w - 115.9).abs() < 1e-9);
        assert!((h - 255.6).abs() < 1e-9);
    }

    #[test]
    fn test_margin_over_limit_rejected() {
        let geometry = PageGeometry {
            margin_mm: 50.1,
            ..PageGeometry::default()
        };
        assert!(matches!(
            geometry.printable_mm(),
            Err(PaginateError::InvalidGeometry(_))
        ));
    }

    #[test]
    fn test_negative_margin_rejected() {
        let geometry = PageGeometry {
            margin_mm: -1.0,
            ..PageGeometry::default()
        };
        assert!(matches!(
            geometry.printable_mm(),
            Err(PaginateError::InvalidGeometry(_))
        ));
    }

    #[test]
    fn test_zero_quality_rejected() {
        let geometry = PageGeometry {
            quality: 0.0,
            ..PageGeometry::default()
        };
        assert!(matches!(
            geometry.printable_mm(),
            Err(PaginateError::InvalidGeometry(_))
        ));
    }

    #[test]
    fn test_quality_above_one_rejected() {
        let geometry = PageGeometry {
            quality: 1.5,
            ..PageGeometry::default()
        };
        assert!(matches!(
            geometry.printable_mm(),
            Err(PaginateError::InvalidGeometry(_))
        ));
    }

    #[test]
    fn test_geometry_deserializes_from_json() {
        let json = r#"{
            "page_size": "Letter",
            "orientation": "Landscape",
            "margin_mm": 12.5,
            "quality": 0.8
        }"#;
        let geometry: PageGeometry = serde_json::from_str(json).unwrap();
        assert_eq!(geometry.page_size, PageSize::Letter);
        assert_eq!(geometry.orientation, Orientation::Landscape);
        assert_eq!(geometry.margin_mm, 12.5);
    }
}
