//! Luminaire dirt depreciation (maintenance factor)
//!
//! Light output retained after `t` years in service:
//!
//! FM = exp(-A · t^B)
//!
//! `B` depends only on the luminaire's enclosure category; `A` depends on
//! both the category and the cleanliness of the surrounding atmosphere.
//!
//! # Time base
//! Coefficients are calibrated for time in years. Callers supply months,
//! which are converted (`t = months / 12`) before exponentiation.
//!
//! # References
//! - IES Lighting Handbook, luminaire dirt depreciation (LDD) curves,
//!   maintenance categories I-VI

use crate::core_types::{Months, Years};
use crate::error::{LightingError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Luminaire maintenance category, by enclosure and ventilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaintenanceCategory {
    /// I: bare lamp, no enclosure
    I,
    /// II: open top with apertures for convection
    II,
    /// III: open top with small apertures
    III,
    /// IV: closed top, open bottom
    IV,
    /// V: enclosed, not gasketed
    V,
    /// VI: enclosed and gasketed
    VI,
}

impl MaintenanceCategory {
    pub const ALL: [MaintenanceCategory; 6] = [
        MaintenanceCategory::I,
        MaintenanceCategory::II,
        MaintenanceCategory::III,
        MaintenanceCategory::IV,
        MaintenanceCategory::V,
        MaintenanceCategory::VI,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

impl TryFrom<u8> for MaintenanceCategory {
    type Error = LightingError;

    /// 1-based ordinal: 1 = I ... 6 = VI
    fn try_from(ordinal: u8) -> Result<Self> {
        ordinal
            .checked_sub(1)
            .and_then(|i| Self::ALL.get(usize::from(i)).copied())
            .ok_or(LightingError::InvalidSelection {
                domain: "maintenance category",
                value: i64::from(ordinal),
                max: 6,
            })
    }
}

impl fmt::Display for MaintenanceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let roman = ["I", "II", "III", "IV", "V", "VI"][self.index()];
        write!(f, "Category {roman}")
    }
}

/// Cleanliness of the atmosphere around the luminaire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AtmosphereCondition {
    VeryClean,
    Clean,
    Medium,
    Dirty,
    VeryDirty,
}

impl AtmosphereCondition {
    pub const ALL: [AtmosphereCondition; 5] = [
        AtmosphereCondition::VeryClean,
        AtmosphereCondition::Clean,
        AtmosphereCondition::Medium,
        AtmosphereCondition::Dirty,
        AtmosphereCondition::VeryDirty,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

impl TryFrom<u8> for AtmosphereCondition {
    type Error = LightingError;

    /// 1-based ordinal: 1 = very clean ... 5 = very dirty
    fn try_from(ordinal: u8) -> Result<Self> {
        ordinal
            .checked_sub(1)
            .and_then(|i| Self::ALL.get(usize::from(i)).copied())
            .ok_or(LightingError::InvalidSelection {
                domain: "atmosphere condition",
                value: i64::from(ordinal),
                max: 5,
            })
    }
}

impl fmt::Display for AtmosphereCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::VeryClean => "very clean",
            Self::Clean => "clean",
            Self::Medium => "medium",
            Self::Dirty => "dirty",
            Self::VeryDirty => "very dirty",
        };
        f.write_str(name)
    }
}

/// `(A, B)` pair of the exponential decay law.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecayCoefficients {
    pub a: f64,
    pub b: f64,
}

impl DecayCoefficients {
    pub const fn new(a: f64, b: f64) -> Self {
        Self { a, b }
    }

    /// Look up the coefficients for a category and atmosphere.
    pub fn lookup(category: MaintenanceCategory, condition: AtmosphereCondition) -> Self {
        Self {
            a: DECAY_A[category.index()][condition.index()],
            b: DECAY_B[category.index()],
        }
    }

    /// `exp(-A · t^B)` for `t` years in service.
    ///
    /// # Errors
    /// [`LightingError::Domain`] when `t` is negative or not finite.
    pub fn factor_at(&self, t: Years) -> Result<f64> {
        if !t.is_finite() || *t < 0.0 {
            return Err(LightingError::Domain {
                quantity: "time in service",
                value: *t,
                requirement: "must be finite and not negative",
            });
        }
        Ok((-self.a * t.powf(self.b)).exp())
    }
}

/// Exponent `B` per category I..VI.
const DECAY_B: [f64; 6] = [0.69, 0.62, 0.70, 0.72, 0.53, 0.88];

/// Coefficient `A` per category (rows I..VI) and atmosphere (very clean..very dirty).
const DECAY_A: [[f64; 5]; 6] = [
    [0.038, 0.071, 0.111, 0.162, 0.301],
    [0.033, 0.068, 0.102, 0.147, 0.188],
    [0.079, 0.106, 0.143, 0.184, 0.236],
    [0.070, 0.131, 0.216, 0.314, 0.452],
    [0.078, 0.128, 0.190, 0.249, 0.321],
    [0.076, 0.145, 0.218, 0.284, 0.396],
];

/// Maintenance factor after `months` in service.
///
/// # Errors
/// [`LightingError::Domain`] when `months` is negative or not finite.
pub fn maintenance_factor(
    category: MaintenanceCategory,
    condition: AtmosphereCondition,
    months: Months,
) -> Result<f64> {
    DecayCoefficients::lookup(category, condition).factor_at(months.to_years())
}

/// Maintenance factor from raw 1-based ordinals, as a form would submit them.
///
/// # Errors
/// [`LightingError::InvalidSelection`] for an ordinal outside its set,
/// [`LightingError::Domain`] for negative or non-finite `months`.
pub fn maintenance_factor_from_ordinals(category: u8, condition: u8, months: f64) -> Result<f64> {
    maintenance_factor(
        MaintenanceCategory::try_from(category)?,
        AtmosphereCondition::try_from(condition)?,
        Months::new(months),
    )
}
