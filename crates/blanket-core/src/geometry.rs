#![forbid(unsafe_code)]

//! Geometric primitives.
//!
//! All lengths are in the host's logical units (points on most platforms).
//! The vertical axis grows downward, so a positive `dy` moves toward the
//! bottom edge of the screen.

/// A width/height pair reported by layout measurement.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Size {
    /// Horizontal extent.
    pub width: f64,
    /// Vertical extent.
    pub height: f64,
}

impl Size {
    /// Zero-sized.
    pub const ZERO: Self = Self::new(0.0, 0.0);

    /// Create a new size.
    #[inline]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// A 2D displacement or velocity.
///
/// Drag recognizers report translations (`dx`, `dy` in units) and release
/// velocities (units per second) with this type.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vector {
    /// Horizontal component.
    pub dx: f64,
    /// Vertical component (positive = downward).
    pub dy: f64,
}

impl Vector {
    /// No displacement.
    pub const ZERO: Self = Self::new(0.0, 0.0);

    /// Create a new vector.
    #[inline]
    pub const fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }

    /// Vertical-only vector.
    #[inline]
    pub const fn vertical(dy: f64) -> Self {
        Self { dx: 0.0, dy }
    }

    /// Release velocity for recognizers that only expose a predicted end
    /// location instead of a measured velocity.
    ///
    /// The distance still to travel stands in for the velocity, which keeps
    /// flick detection working with the same thresholds.
    #[inline]
    pub fn from_predicted_end(location: Vector, predicted_end: Vector) -> Self {
        Self {
            dx: predicted_end.dx - location.dx,
            dy: predicted_end.dy - location.dy,
        }
    }
}

impl std::ops::Add for Vector {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.dx + rhs.dx, self.dy + rhs.dy)
    }
}

impl std::ops::Sub for Vector {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.dx - rhs.dx, self.dy - rhs.dy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predicted_end_difference() {
        let v = Vector::from_predicted_end(Vector::new(10.0, 100.0), Vector::new(12.0, 260.0));
        assert_eq!(v, Vector::new(2.0, 160.0));
    }

    #[test]
    fn vector_arithmetic() {
        let a = Vector::new(1.0, 2.0);
        let b = Vector::new(0.5, -3.0);
        assert_eq!(a + b, Vector::new(1.5, -1.0));
        assert_eq!(a - b, Vector::new(0.5, 5.0));
    }

    #[test]
    fn defaults_are_zero() {
        assert_eq!(Size::default(), Size::ZERO);
        assert_eq!(Vector::default(), Vector::ZERO);
    }
}
