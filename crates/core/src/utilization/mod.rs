//! Utilization coefficient engine
//!
//! Two independent ways of obtaining the fraction of luminaire output that
//! reaches the working plane:
//! - measured: integrate a photometric table ([`from_photometry`])
//! - estimated: closed-form approximation from room geometry and surface
//!   reflectances ([`estimate_from_room`])
//!
//! A measured value always supersedes an estimate ([`CoefficientSource::select`]).

mod photometric;
mod room;

pub use photometric::{
    from_photometry, from_photometry_with_flux, from_profile, useful_flux, DOWNWARD_LIMIT,
};
pub use room::{
    estimate_from_room, sigmoid, RoomGeometry, SurfaceReflectances, ESTIMATE_SCALE, RCR_MIDPOINT,
};

use crate::core_types::Lumens;
use serde::{Deserialize, Serialize};

/// Integrated useful flux and the resulting utilization coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UtilizationResult {
    /// Flux reaching the working plane
    pub useful_flux: Lumens,
    /// Flux the coefficient is relative to
    pub total_flux: Lumens,
    /// `useful_flux / total_flux`, unclamped
    pub coefficient: f64,
}

impl UtilizationResult {
    pub fn new(useful_flux: Lumens, total_flux: Lumens) -> Self {
        Self {
            useful_flux,
            total_flux,
            coefficient: useful_flux / total_flux,
        }
    }

    /// Coefficient clamped to [0, 1] for presentation.
    ///
    /// Measurement noise can push the raw ratio slightly above 1; use
    /// [`UtilizationResult::exceeds_unity`] to report that before clamping.
    pub fn clamped(&self) -> f64 {
        self.coefficient.clamp(0.0, 1.0)
    }

    pub fn exceeds_unity(&self) -> bool {
        self.coefficient > 1.0
    }
}

/// The coefficient actually used for sizing, and where it came from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CoefficientSource {
    /// Integrated from a photometric file
    Photometric(UtilizationResult),
    /// Estimated from room cavity ratio and reflectances
    RoomEstimate { rcr: f64, coefficient: f64 },
}

impl CoefficientSource {
    /// Prefer the measured result; fall back to the estimate.
    pub fn select(measured: Option<UtilizationResult>, rcr: f64, estimate: f64) -> Self {
        match measured {
            Some(result) => Self::Photometric(result),
            None => Self::RoomEstimate {
                rcr,
                coefficient: estimate,
            },
        }
    }

    pub fn coefficient(&self) -> f64 {
        match self {
            Self::Photometric(result) => result.coefficient,
            Self::RoomEstimate { coefficient, .. } => *coefficient,
        }
    }

    pub fn is_measured(&self) -> bool {
        matches!(self, Self::Photometric(_))
    }
}

/// Side-by-side view of a measured and an estimated coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoefficientComparison {
    pub measured: f64,
    pub estimated: f64,
    /// `measured - estimated`
    pub difference: f64,
    /// `difference / estimated`; `None` when the estimate is zero
    pub relative_difference: Option<f64>,
}

impl CoefficientComparison {
    pub fn new(measured: f64, estimated: f64) -> Self {
        let difference = measured - estimated;
        Self {
            measured,
            estimated,
            difference,
            relative_difference: (estimated != 0.0).then_some(difference / estimated),
        }
    }
}
