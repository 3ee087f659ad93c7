//! End-to-end lighting study
//!
//! Chains the engines in the order a designer works through them:
//! room geometry → cavity ratio → utilization coefficient (measured when a
//! photometric table is supplied, estimated otherwise) → maintenance factor →
//! luminaire count. Every intermediate quantity is returned in the report.

use crate::core_types::{Lumens, Lux, Meters, Months, SquareMeters};
use crate::error::Result;
use crate::illuminance_levels::WorkArea;
use crate::maintenance::{maintenance_factor, AtmosphereCondition, MaintenanceCategory};
use crate::photometry::PhotometricTable;
use crate::sizing::{required_luminaires, SizingResult};
use crate::utilization::{
    estimate_from_room, from_photometry_with_flux, CoefficientComparison, CoefficientSource,
    RoomGeometry, SurfaceReflectances, UtilizationResult,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Maintenance inputs of a study.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceSelection {
    pub category: MaintenanceCategory,
    pub condition: AtmosphereCondition,
    pub months_in_service: Months,
}

impl Default for MaintenanceSelection {
    /// Freshly installed open luminaire in a clean room
    fn default() -> Self {
        Self {
            category: MaintenanceCategory::I,
            condition: AtmosphereCondition::Clean,
            months_in_service: Months::new(0.0),
        }
    }
}

/// All inputs of one sizing study.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LightingStudy {
    pub room: RoomGeometry,
    pub reflectances: SurfaceReflectances,
    pub work_area: WorkArea,
    /// Rated output of one luminaire
    pub luminaire_flux: Lumens,
    pub maintenance: MaintenanceSelection,
    /// Flux the measured coefficient is relative to; the table's declared
    /// flux when `None`
    pub coefficient_flux: Option<Lumens>,
}

impl Default for LightingStudy {
    /// 4 x 4 m office, luminaires at 3.0 m, desks at 0.8 m, 1200 lm each
    fn default() -> Self {
        Self {
            room: RoomGeometry::new(
                Meters::new(4.0),
                Meters::new(4.0),
                Meters::new(3.0),
                Meters::new(0.8),
            ),
            reflectances: SurfaceReflectances::default(),
            work_area: WorkArea::OfficeWork,
            luminaire_flux: Lumens::new(1200.0),
            maintenance: MaintenanceSelection::default(),
            coefficient_flux: None,
        }
    }
}

/// Measured-vs-estimated view, present when a table was supplied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EstimateCheck {
    pub coefficients: CoefficientComparison,
    /// Count the estimate alone would have required; `None` when the
    /// estimate is not positive
    pub estimated_count: Option<u32>,
}

/// Every quantity a study derives.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StudyReport {
    pub area: SquareMeters,
    pub effective_height: Meters,
    pub room_cavity_ratio: f64,
    /// Cavity ratio rounded to two decimals
    pub room_cavity_ratio_display: f64,
    pub estimated_coefficient: f64,
    pub measured: Option<UtilizationResult>,
    pub coefficient: CoefficientSource,
    pub maintenance_factor: f64,
    pub target: Lux,
    pub sizing: SizingResult,
    pub estimate_check: Option<EstimateCheck>,
}

impl StudyReport {
    pub fn required_count(&self) -> u32 {
        self.sizing.required_count
    }

    /// Illuminance for a trial count under the study's conditions.
    pub fn illuminance_for(&self, count: u32) -> Lux {
        self.sizing.illuminance_for(count)
    }
}

impl LightingStudy {
    /// Run the study, using `photometry` for the coefficient when given.
    ///
    /// # Errors
    /// Propagates [`crate::LightingError`] from any stage: non-finite room
    /// inputs, a non-positive coefficient flux, negative time in service, or
    /// a sizing precondition (area, target, delivered flux).
    pub fn run(&self, photometry: Option<&PhotometricTable>) -> Result<StudyReport> {
        let rcr = self.room.room_cavity_ratio();
        let estimated = estimate_from_room(rcr, self.reflectances)?;

        let measured = photometry
            .map(|table| {
                let flux = self
                    .coefficient_flux
                    .unwrap_or_else(|| table.declared_total_flux());
                from_photometry_with_flux(table, flux)
            })
            .transpose()?;
        let coefficient = CoefficientSource::select(measured, rcr, estimated);

        let fm = maintenance_factor(
            self.maintenance.category,
            self.maintenance.condition,
            self.maintenance.months_in_service,
        )?;
        let target = self.work_area.required_illuminance();
        let area = self.room.area();

        let sizing = SizingResult::compute(
            area,
            target,
            self.luminaire_flux,
            coefficient.coefficient(),
            fm,
        )?;

        let estimate_check = match measured {
            Some(result) => {
                // Diagnostic only: a count the estimate can't size is reported as absent
                let estimated_count = if estimated > 0.0 {
                    required_luminaires(area, target, self.luminaire_flux, estimated, fm).ok()
                } else {
                    None
                };
                Some(EstimateCheck {
                    coefficients: CoefficientComparison::new(result.coefficient, estimated),
                    estimated_count,
                })
            }
            None => None,
        };

        debug!(
            rcr,
            coefficient = coefficient.coefficient(),
            measured = coefficient.is_measured(),
            maintenance_factor = fm,
            count = sizing.required_count,
            "lighting study complete"
        );

        Ok(StudyReport {
            area,
            effective_height: self.room.effective_height(),
            room_cavity_ratio: rcr,
            room_cavity_ratio_display: self.room.room_cavity_ratio_display(),
            estimated_coefficient: estimated,
            measured,
            coefficient,
            maintenance_factor: fm,
            target,
            sizing,
            estimate_check,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::DMatrix;

    #[test]
    fn test_default_study_matches_reference_room() {
        let report = LightingStudy::default().run(None).unwrap();

        assert!((report.room_cavity_ratio - 5.5).abs() < 1e-9);
        assert!((report.estimated_coefficient - 0.2588).abs() < 1e-3);
        assert_eq!(report.maintenance_factor, 1.0);
        assert_eq!(report.target, Lux::new(300.0));
        assert_eq!(report.required_count(), 16);
        assert!(!report.coefficient.is_measured());
        assert!(report.estimate_check.is_none());
    }

    #[test]
    fn test_measured_coefficient_takes_precedence() {
        let angles: Vec<f64> = (0..=18).map(|i| f64::from(i) * 5.0).collect();
        let n = angles.len();
        let table = PhotometricTable::new(
            angles,
            vec![0.0],
            DMatrix::from_row_slice(1, n, &vec![200.0; n]),
            Lumens::new(1200.0),
        )
        .unwrap();

        let report = LightingStudy::default().run(Some(&table)).unwrap();
        assert!(report.coefficient.is_measured());
        // ~200π / 1200, less the trapezoid's truncation at 5° steps
        assert!((report.coefficient.coefficient() - 0.5236).abs() < 5e-3);

        let check = report.estimate_check.unwrap();
        assert!(check.coefficients.difference > 0.0);
        assert!(check.estimated_count.unwrap() > report.required_count());
    }

    #[test]
    fn test_unsizable_estimate_does_not_abort_measured_study() {
        let angles: Vec<f64> = (0..=18).map(|i| f64::from(i) * 5.0).collect();
        let n = angles.len();
        let table = PhotometricTable::new(
            angles,
            vec![0.0],
            DMatrix::from_row_slice(1, n, &vec![200.0; n]),
            Lumens::new(1200.0),
        )
        .unwrap();
        let study = LightingStudy {
            reflectances: SurfaceReflectances::new(1e-12, 1e-12, 1e-12),
            ..LightingStudy::default()
        };

        let report = study.run(Some(&table)).unwrap();
        assert!(report.coefficient.is_measured());
        assert!(report.required_count() > 0);

        let check = report.estimate_check.unwrap();
        assert!(check.coefficients.estimated > 0.0);
        assert_eq!(check.estimated_count, None);
    }

    #[test]
    fn test_aged_installation_needs_more_luminaires() {
        let fresh = LightingStudy::default().run(None).unwrap();
        let aged = LightingStudy {
            maintenance: MaintenanceSelection {
                category: MaintenanceCategory::IV,
                condition: AtmosphereCondition::Dirty,
                months_in_service: Months::new(36.0),
            },
            ..LightingStudy::default()
        }
        .run(None)
        .unwrap();

        assert!(aged.maintenance_factor < 1.0);
        assert!(aged.required_count() > fresh.required_count());
    }
}
