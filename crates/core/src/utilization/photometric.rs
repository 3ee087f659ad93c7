//! Utilization coefficient from a measured intensity distribution.
//!
//! Flux reaching a horizontal plane below the source:
//!
//! Φ_useful = ∫₀^{π/2} I(θ) · sin θ · 2π · cos θ dθ
//!
//! evaluated with the trapezoidal rule over the file's own angle samples,
//! using the mean of all horizontal planes as I(θ).

use super::UtilizationResult;
use crate::core_types::{Degrees, Lumens};
use crate::error::{ensure_positive, Result};
use crate::photometry::{IntensityProfile, PhotometricTable};
use std::f64::consts::TAU;
use tracing::trace;

/// Vertical angles above this point away from the working plane.
pub const DOWNWARD_LIMIT: Degrees = Degrees::new(90.0);

/// Integrate an intensity curve over the downward hemisphere.
///
/// Samples above [`DOWNWARD_LIMIT`] are ignored. Fewer than two remaining
/// samples integrate to zero.
pub fn useful_flux(angles_deg: &[f64], intensity: &[f64]) -> Lumens {
    let samples: Vec<(f64, f64)> = angles_deg
        .iter()
        .zip(intensity)
        .filter(|(angle, _)| **angle <= *DOWNWARD_LIMIT)
        .map(|(&angle, &cd)| {
            let theta = Degrees::new(angle).to_radians();
            (*theta, cd * theta.sin() * TAU * theta.cos())
        })
        .collect();

    let flux: f64 = samples
        .windows(2)
        .map(|w| (w[1].0 - w[0].0) * (w[0].1 + w[1].1) / 2.0)
        .sum();
    trace!(samples = samples.len(), flux, "integrated downward flux");
    Lumens::new(flux)
}

/// Utilization coefficient against the file's declared total flux.
///
/// # Errors
/// [`crate::LightingError::Domain`] when the declared flux is not positive
/// (absolute-photometry files declare `-1`); use
/// [`from_photometry_with_flux`] with a known flux instead.
pub fn from_photometry(table: &PhotometricTable) -> Result<UtilizationResult> {
    from_photometry_with_flux(table, table.declared_total_flux())
}

/// Utilization coefficient against a caller-supplied total flux.
///
/// # Errors
/// [`crate::LightingError::Domain`] when `total_flux` is not positive.
pub fn from_photometry_with_flux(
    table: &PhotometricTable,
    total_flux: Lumens,
) -> Result<UtilizationResult> {
    ensure_positive("total flux", *total_flux)?;
    let mean = table.mean_intensity();
    Ok(UtilizationResult::new(
        useful_flux(table.vertical_angles(), &mean),
        total_flux,
    ))
}

/// Utilization coefficient of a heuristically recovered curve.
///
/// # Errors
/// [`crate::LightingError::Domain`] when `total_flux` is not positive.
pub fn from_profile(profile: &IntensityProfile, total_flux: Lumens) -> Result<UtilizationResult> {
    ensure_positive("total flux", *total_flux)?;
    Ok(UtilizationResult::new(
        useful_flux(&profile.angles, &profile.candela),
        total_flux,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LightingError;
    use nalgebra::DMatrix;
    use std::f64::consts::PI;

    fn uniform_angles(step: f64, max: f64) -> Vec<f64> {
        let n = (max / step).round() as usize;
        (0..=n).map(|i| i as f64 * step).collect()
    }

    #[test]
    fn test_uniform_intensity_integrates_to_pi() {
        // ∫ I sinθ cosθ 2π dθ over [0, π/2] = π·I for constant I
        let angles = uniform_angles(0.5, 90.0);
        let intensity = vec![100.0; angles.len()];
        let flux = useful_flux(&angles, &intensity);
        assert!((*flux - 100.0 * PI).abs() < 0.05, "flux was {flux}");
    }

    #[test]
    fn test_upward_samples_ignored() {
        let mut angles = uniform_angles(5.0, 90.0);
        let mut intensity = vec![50.0; angles.len()];
        let down_only = useful_flux(&angles, &intensity);

        angles.extend([120.0, 150.0, 180.0]);
        intensity.extend([5000.0, 5000.0, 5000.0]);
        let with_up = useful_flux(&angles, &intensity);

        assert_eq!(down_only, with_up);
    }

    #[test]
    fn test_single_sample_is_zero() {
        assert_eq!(useful_flux(&[0.0], &[1000.0]), Lumens::new(0.0));
    }

    #[test]
    fn test_from_photometry_uses_plane_mean() {
        let angles = uniform_angles(10.0, 90.0);
        let n = angles.len();
        // Two planes averaging to a constant 200 cd
        let mut values = vec![100.0; n];
        values.extend(vec![300.0; n]);
        let table = PhotometricTable::new(
            angles,
            vec![0.0, 90.0],
            DMatrix::from_row_slice(2, n, &values),
            Lumens::new(1000.0),
        )
        .unwrap();

        let result = from_photometry(&table).unwrap();
        let expected = useful_flux(table.vertical_angles(), &vec![200.0; n]);
        assert!((*result.useful_flux - *expected).abs() < 1e-9);
        assert!((result.coefficient - *expected / 1000.0).abs() < 1e-12);
    }

    #[test]
    fn test_non_positive_flux_is_domain_error() {
        let table = PhotometricTable::new(
            vec![0.0, 90.0],
            vec![0.0],
            DMatrix::from_row_slice(1, 2, &[100.0, 0.0]),
            Lumens::new(-1.0),
        )
        .unwrap();
        assert!(matches!(
            from_photometry(&table),
            Err(LightingError::Domain { .. })
        ));
        assert!(from_photometry_with_flux(&table, Lumens::new(500.0)).is_ok());
    }

    #[test]
    fn test_from_profile() {
        let profile = IntensityProfile {
            angles: uniform_angles(1.0, 90.0),
            candela: vec![400.0; 91],
        };
        let result = from_profile(&profile, Lumens::new(4000.0)).unwrap();
        assert!((result.coefficient - 400.0 * PI / 4000.0).abs() < 1e-3);
    }
}
