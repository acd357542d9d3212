//! Size units and conversion between them.
//!
//! The solver itself works purely in integer pixels and integer percent;
//! translating styled sizes (points, ems) into those units is a concern of
//! the styling layer sitting above it, and lives here so the solver crates
//! never see a non-pixel unit.

use thiserror::Error;

/// Errors that can occur converting between units.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitError {
    #[error("cannot convert to {0:?}: conversion basis is zero")]
    ZeroBasis(SizeUnit),
}

/// Measurement units understood by the styling layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeUnit {
    /// Relative unit. Resolves against the layout space available.
    Percent,
    /// Absolute unit. All other units convert down to this in the end.
    Pixels,
    /// Absolute unit. Converts to pixels through the font metrics.
    Points,
    /// Font-relative unit. Converts to pixels through the current em size.
    Ems,
}

/// A magnitude together with its unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    pub value: i32,
    pub unit: SizeUnit,
}

impl Size {
    pub const fn pixels(value: i32) -> Self {
        Self {
            value,
            unit: SizeUnit::Pixels,
        }
    }

    pub const fn percent(value: i32) -> Self {
        Self {
            value,
            unit: SizeUnit::Percent,
        }
    }

    pub const fn points(value: i32) -> Self {
        Self {
            value,
            unit: SizeUnit::Points,
        }
    }

    pub const fn ems(value: i32) -> Self {
        Self {
            value,
            unit: SizeUnit::Ems,
        }
    }
}

/// The measurements a conversion resolves against: font metrics plus the
/// layout space available on the axis in question.
#[derive(Debug, Clone, Copy)]
pub struct UnitContext {
    pub pixels_per_em: f64,
    pub pixels_per_point: f64,
    pub size_available: i32,
}

impl UnitContext {
    pub fn new(pixels_per_em: f64, pixels_per_point: f64, size_available: i32) -> Self {
        Self {
            pixels_per_em,
            pixels_per_point,
            size_available,
        }
    }

    /// Convert `size` to `target`, going through pixels.
    ///
    /// Converting *to* a unit whose basis is zero (percent of a zero-sized
    /// axis, ems with no font) is an error; converting *from* one simply
    /// yields zero pixels.
    pub fn convert(&self, size: Size, target: SizeUnit) -> Result<Size, UnitError> {
        let pixels = self.resolve_pixels(size);

        let value = match target {
            SizeUnit::Pixels => pixels,
            SizeUnit::Percent => {
                if self.size_available == 0 {
                    return Err(UnitError::ZeroBasis(target));
                }
                (pixels / f64::from(self.size_available)) * 100.0
            }
            SizeUnit::Ems => {
                if self.pixels_per_em == 0.0 {
                    return Err(UnitError::ZeroBasis(target));
                }
                pixels / self.pixels_per_em
            }
            SizeUnit::Points => {
                if self.pixels_per_point == 0.0 {
                    return Err(UnitError::ZeroBasis(target));
                }
                pixels / self.pixels_per_point
            }
        };

        Ok(Size {
            value: value as i32,
            unit: target,
        })
    }

    /// Resolve `size` to whole pixels, truncating.
    pub fn to_pixels(&self, size: Size) -> i32 {
        self.resolve_pixels(size) as i32
    }

    fn resolve_pixels(&self, size: Size) -> f64 {
        match size.unit {
            SizeUnit::Pixels => f64::from(size.value),
            SizeUnit::Percent => (f64::from(size.value) / 100.0) * f64::from(self.size_available),
            SizeUnit::Ems => f64::from(size.value) * self.pixels_per_em,
            SizeUnit::Points => f64::from(size.value) * self.pixels_per_point,
        }
    }
}
