//! Room geometry and the reflectance-based utilization estimate.
//!
//! Used when no photometric file is available. The estimate is a closed-form
//! stand-in for a manufacturer's CU table: it scales with mean surface
//! reflectance and saturates as the room cavity ratio grows.

use crate::core_types::{Meters, SquareMeters};
use crate::error::{LightingError, Result};
use serde::{Deserialize, Serialize};

/// Scale applied to the mean reflectance in the estimate.
pub const ESTIMATE_SCALE: f64 = 0.6;

/// Cavity ratio at which the estimate's sigmoid reaches half its asymptote.
pub const RCR_MIDPOINT: f64 = 3.0;

/// Rectangular room with a single luminaire mounting height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoomGeometry {
    pub length: Meters,
    pub width: Meters,
    /// Floor to luminaire centre
    pub mounting_height: Meters,
    /// Floor to working plane (0.8 m for desks and benches)
    pub work_plane_height: Meters,
}

impl RoomGeometry {
    pub fn new(
        length: Meters,
        width: Meters,
        mounting_height: Meters,
        work_plane_height: Meters,
    ) -> Self {
        Self {
            length,
            width,
            mounting_height,
            work_plane_height,
        }
    }

    pub fn area(&self) -> SquareMeters {
        self.length * self.width
    }

    /// Height of the room cavity; may be zero or negative.
    pub fn effective_height(&self) -> Meters {
        self.mounting_height - self.work_plane_height
    }

    /// Room cavity ratio `5·h·(L + W) / A` at full precision.
    ///
    /// Zero when the area or the effective height is not positive: there is
    /// no usable cavity to speak of.
    pub fn room_cavity_ratio(&self) -> f64 {
        let area = *self.area();
        let height = *self.effective_height();
        if area <= 0.0 || height <= 0.0 {
            return 0.0;
        }
        5.0 * height * (*self.length + *self.width) / area
    }

    /// Room cavity ratio rounded to two decimals, for display only.
    pub fn room_cavity_ratio_display(&self) -> f64 {
        round_to(self.room_cavity_ratio(), 2)
    }
}

/// Reflectances of the three room surfaces, each in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceReflectances {
    pub ceiling: f64,
    pub walls: f64,
    pub floor: f64,
}

impl SurfaceReflectances {
    pub fn new(ceiling: f64, walls: f64, floor: f64) -> Self {
        Self {
            ceiling,
            walls,
            floor,
        }
    }

    pub fn mean(&self) -> f64 {
        (self.ceiling + self.walls + self.floor) / 3.0
    }
}

impl Default for SurfaceReflectances {
    /// Light ceiling, mid-tone walls, dark floor
    fn default() -> Self {
        Self::new(0.7, 0.5, 0.2)
    }
}

/// Logistic curve `1 / (1 + e^-(x - midpoint))`.
pub fn sigmoid(x: f64, midpoint: f64) -> f64 {
    1.0 / (1.0 + (-(x - midpoint)).exp())
}

/// Estimate the utilization coefficient from the cavity ratio and reflectances.
///
/// `0.6 · mean(ρ) · sigmoid(rcr, 3)`. Reflectances are trusted to lie in
/// [0, 1]; only finiteness is checked here.
///
/// # Errors
/// [`LightingError::Domain`] when `rcr` or a reflectance is not finite.
pub fn estimate_from_room(rcr: f64, reflectances: SurfaceReflectances) -> Result<f64> {
    for (quantity, value) in [
        ("room cavity ratio", rcr),
        ("ceiling reflectance", reflectances.ceiling),
        ("wall reflectance", reflectances.walls),
        ("floor reflectance", reflectances.floor),
    ] {
        if !value.is_finite() {
            return Err(LightingError::Domain {
                quantity,
                value,
                requirement: "must be finite",
            });
        }
    }
    Ok(ESTIMATE_SCALE * reflectances.mean() * sigmoid(rcr, RCR_MIDPOINT))
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn room(length: f64, width: f64, mounting: f64, work: f64) -> RoomGeometry {
        RoomGeometry::new(
            Meters::new(length),
            Meters::new(width),
            Meters::new(mounting),
            Meters::new(work),
        )
    }

    #[test]
    fn test_rcr_reference_room() {
        // 4 x 4 m, mounted at 3.0 m over a 0.8 m desk: 5 * 2.2 * 8 / 16
        let r = room(4.0, 4.0, 3.0, 0.8);
        assert_relative_eq!(*r.area(), 16.0);
        assert_relative_eq!(*r.effective_height(), 2.2, epsilon = 1e-12);
        assert_relative_eq!(r.room_cavity_ratio(), 5.5, epsilon = 1e-12);
        assert_eq!(r.room_cavity_ratio_display(), 5.5);
    }

    #[test]
    fn test_rcr_display_rounding() {
        // 5 * 2.2 * 7 / 12 = 6.41666...
        let r = room(4.0, 3.0, 3.0, 0.8);
        assert_eq!(r.room_cavity_ratio_display(), 6.42);
        assert!(r.room_cavity_ratio() > 6.416 && r.room_cavity_ratio() < 6.417);
    }

    #[test]
    fn test_rcr_degenerate_rooms_are_zero() {
        assert_eq!(room(0.0, 4.0, 3.0, 0.8).room_cavity_ratio(), 0.0);
        assert_eq!(room(4.0, 4.0, 0.8, 0.8).room_cavity_ratio(), 0.0);
        assert_eq!(room(4.0, 4.0, 0.5, 0.8).room_cavity_ratio(), 0.0);
    }

    #[test]
    fn test_sigmoid_midpoint() {
        assert_relative_eq!(sigmoid(3.0, 3.0), 0.5);
        assert!(sigmoid(100.0, 3.0) <= 1.0);
        assert!(sigmoid(-100.0, 3.0) >= 0.0);
    }

    #[test]
    fn test_estimate_reference_room() {
        let cu = estimate_from_room(5.5, SurfaceReflectances::default()).unwrap();
        assert_relative_eq!(cu, 0.2587, epsilon = 1e-4);
    }

    #[test]
    fn test_estimate_saturates() {
        let refl = SurfaceReflectances::new(0.8, 0.8, 0.8);
        let low = estimate_from_room(1.0, refl).unwrap();
        let mid = estimate_from_room(5.0, refl).unwrap();
        let high = estimate_from_room(50.0, refl).unwrap();
        assert!(low < mid && mid < high);
        assert!(high <= ESTIMATE_SCALE * 0.8 + 1e-12);
    }

    #[test]
    fn test_estimate_rejects_nan() {
        let err = estimate_from_room(f64::NAN, SurfaceReflectances::default());
        assert!(matches!(err, Err(LightingError::Domain { .. })));
    }
}
