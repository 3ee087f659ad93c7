//! Illumination sizing (lumen method)
//!
//! Forward: how many luminaires reach a target average illuminance
//!
//! N = ⌈(A · E) / (Φ · CU · FM)⌉
//!
//! Inverse: what average illuminance N luminaires deliver
//!
//! E = (N · Φ · CU · FM) / A

use crate::core_types::{Lumens, Lux, SquareMeters};
use crate::error::{ensure_positive, LightingError, Result};
use serde::{Deserialize, Serialize};

/// Flux each luminaire effectively lands on the working plane (Φ · CU · FM).
fn delivered_flux(flux: Lumens, coefficient: f64, maintenance_factor: f64) -> Result<f64> {
    let delivered = *flux * coefficient * maintenance_factor;
    if delivered.is_finite() && delivered > 0.0 {
        Ok(delivered)
    } else {
        Err(LightingError::Domain {
            quantity: "flux x coefficient x maintenance factor",
            value: delivered,
            requirement: "must be finite and greater than zero",
        })
    }
}

fn illuminance(count: u32, delivered: f64, area: f64) -> f64 {
    f64::from(count) * delivered / area
}

/// Smallest luminaire count whose illuminance meets or exceeds `target`.
///
/// # Errors
/// [`LightingError::Domain`] when `area` or `target` is not positive, when
/// `flux · coefficient · maintenance_factor` is not positive, or when the
/// count doesn't fit in a `u32`.
pub fn required_luminaires(
    area: SquareMeters,
    target: Lux,
    flux: Lumens,
    coefficient: f64,
    maintenance_factor: f64,
) -> Result<u32> {
    let area = ensure_positive("area", *area)?;
    let target = ensure_positive("target illuminance", *target)?;
    let delivered = delivered_flux(flux, coefficient, maintenance_factor)?;

    let exact = area * target / delivered;
    if !exact.is_finite() || exact > f64::from(u32::MAX) {
        return Err(LightingError::Domain {
            quantity: "luminaire count",
            value: exact,
            requirement: "must fit in a 32-bit count",
        });
    }

    // Ceiling, then settle rounding at integer boundaries so the count agrees
    // exactly with `achieved_illuminance`
    let mut count = exact.ceil() as u32;
    while illuminance(count, delivered, area) < target && count < u32::MAX {
        count += 1;
    }
    while count > 1 && illuminance(count - 1, delivered, area) >= target {
        count -= 1;
    }
    Ok(count)
}

/// Average illuminance produced by `count` luminaires.
///
/// # Errors
/// [`LightingError::Domain`] when `area` is not positive.
pub fn achieved_illuminance(
    count: u32,
    flux: Lumens,
    coefficient: f64,
    maintenance_factor: f64,
    area: SquareMeters,
) -> Result<Lux> {
    let area = ensure_positive("area", *area)?;
    let delivered = *flux * coefficient * maintenance_factor;
    Ok(Lux::new(illuminance(count, delivered, area)))
}

/// Required count together with everything needed to explore other counts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizingResult {
    pub required_count: u32,
    pub target: Lux,
    /// Illuminance delivered by `required_count` luminaires
    pub achieved: Lux,
    pub area: SquareMeters,
    pub flux: Lumens,
    pub coefficient: f64,
    pub maintenance_factor: f64,
}

impl SizingResult {
    /// Run the forward calculation and record the illuminance it achieves.
    ///
    /// # Errors
    /// Same as [`required_luminaires`].
    pub fn compute(
        area: SquareMeters,
        target: Lux,
        flux: Lumens,
        coefficient: f64,
        maintenance_factor: f64,
    ) -> Result<Self> {
        let required_count =
            required_luminaires(area, target, flux, coefficient, maintenance_factor)?;
        let achieved =
            achieved_illuminance(required_count, flux, coefficient, maintenance_factor, area)?;
        Ok(Self {
            required_count,
            target,
            achieved,
            area,
            flux,
            coefficient,
            maintenance_factor,
        })
    }

    /// Illuminance a different trial count would deliver in the same room.
    pub fn illuminance_for(&self, count: u32) -> Lux {
        Lux::new(illuminance(
            count,
            *self.flux * self.coefficient * self.maintenance_factor,
            *self.area,
        ))
    }

    /// Achieved over target; at least 1 for the required count.
    pub fn margin(&self) -> f64 {
        *self.achieved / *self.target
    }
}
