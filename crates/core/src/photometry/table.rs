//! Light-distribution tables produced by the photometric parsers.

use crate::core_types::Lumens;
use crate::error::{LightingError, Result};
use nalgebra::DMatrix;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Tilt block declared after the keyword section.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum Tilt {
    /// `TILT=NONE`: output does not vary with lamp inclination
    #[default]
    None,
    /// `TILT=<file>`: tilt data lives in a separate file that is not read
    External(String),
    /// `TILT=INCLUDE`: tilt data embedded in the file
    Include {
        /// Lamp-to-luminaire geometry code (1, 2 or 3)
        geometry: u8,
        /// Tilt angles in degrees
        angles: Vec<f64>,
        /// Output multiplier for each tilt angle
        multipliers: Vec<f64>,
    },
}

/// Where the declared total flux was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FluxOrigin {
    /// Lumens-per-lamp field of the photometric header line
    #[default]
    Header,
    /// A lumen annotation found in the keyword section
    Annotation,
}

/// Everything the structured parser reads besides the candela grid.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PhotometricMetadata {
    /// Format identifier from the first line (e.g. `IESNA:LM-63-2002`)
    pub format_id: Option<String>,
    /// Keyword section (`[MANUFAC]`, `[LUMCAT]`, ...), keys without brackets
    pub keywords: FxHashMap<String, String>,
    pub tilt: Tilt,
    pub lamp_count: Option<f64>,
    /// Multiplier from the photometric line, recorded as read. It is not
    /// applied to [`PhotometricTable::candela`].
    pub candela_multiplier: Option<f64>,
    /// 1 = type C, 2 = type B, 3 = type A
    pub photometric_type: Option<u8>,
    /// 1 = feet, 2 = meters
    pub units_type: Option<u8>,
    /// Luminous opening (width, length, height) in file units
    pub opening: Option<[f64; 3]>,
    pub ballast_factor: Option<f64>,
    pub input_watts: Option<f64>,
    pub flux_origin: FluxOrigin,
}

/// Record of a repaired plane/angle count mismatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resynchronization {
    /// (horizontal planes, vertical angles) as declared in the header
    pub declared: (usize, usize),
    /// (horizontal planes, vertical angles) actually used for the grid
    pub resolved: (usize, usize),
}

/// Structured luminous-intensity distribution of one luminaire.
///
/// Immutable after construction. The candela grid has one row per
/// horizontal plane and one column per vertical angle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotometricTable {
    vertical_angles: Vec<f64>,
    horizontal_angles: Vec<f64>,
    candela: DMatrix<f64>,
    declared_total_flux: Lumens,
    metadata: PhotometricMetadata,
    resynchronization: Option<Resynchronization>,
}

impl PhotometricTable {
    /// Build a table from already-shaped data, validating its invariants.
    ///
    /// # Errors
    /// [`LightingError::Format`] when the grid shape disagrees with the angle
    /// lists, a vertical angle lies outside [0, 180] or the list is not
    /// strictly ascending, or a candela value is negative or non-finite.
    pub fn new(
        vertical_angles: Vec<f64>,
        horizontal_angles: Vec<f64>,
        candela: DMatrix<f64>,
        declared_total_flux: Lumens,
    ) -> Result<Self> {
        if candela.ncols() != vertical_angles.len() {
            return Err(LightingError::format(
                "candela grid",
                format!("{} columns (one per vertical angle)", vertical_angles.len()),
                format!("{} columns", candela.ncols()),
            ));
        }
        if candela.nrows() != horizontal_angles.len() {
            return Err(LightingError::format(
                "candela grid",
                format!("{} rows (one per horizontal plane)", horizontal_angles.len()),
                format!("{} rows", candela.nrows()),
            ));
        }
        if vertical_angles.is_empty() {
            return Err(LightingError::format(
                "vertical angles",
                "at least one angle",
                "none",
            ));
        }
        if horizontal_angles.is_empty() {
            return Err(LightingError::format(
                "horizontal angles",
                "at least one plane",
                "none",
            ));
        }

        if let Some(bad) = vertical_angles
            .iter()
            .find(|a| !(0.0..=180.0).contains(*a))
        {
            return Err(LightingError::format(
                "vertical angles",
                "values within [0, 180] degrees",
                format!("{bad}"),
            ));
        }
        if let Some(pair) = vertical_angles.windows(2).find(|w| w[1] <= w[0]) {
            return Err(LightingError::format(
                "vertical angles",
                "strictly ascending values",
                format!("{} followed by {}", pair[0], pair[1]),
            ));
        }
        if let Some(bad) = candela.iter().find(|c| !c.is_finite() || **c < 0.0) {
            return Err(LightingError::format(
                "candela values",
                "finite values >= 0",
                format!("{bad}"),
            ));
        }

        Ok(Self {
            vertical_angles,
            horizontal_angles,
            candela,
            declared_total_flux,
            metadata: PhotometricMetadata::default(),
            resynchronization: None,
        })
    }

    pub(crate) fn with_metadata(mut self, metadata: PhotometricMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub(crate) fn with_resynchronization(mut self, resync: Option<Resynchronization>) -> Self {
        self.resynchronization = resync;
        self
    }

    /// Vertical angles in degrees, ascending
    pub fn vertical_angles(&self) -> &[f64] {
        &self.vertical_angles
    }

    /// Horizontal plane angles in degrees
    pub fn horizontal_angles(&self) -> &[f64] {
        &self.horizontal_angles
    }

    /// Candela grid, rows = horizontal planes, columns = vertical angles.
    ///
    /// Values are as written in the file; the header's candela multiplier is
    /// kept in [`PhotometricMetadata::candela_multiplier`] and not applied.
    pub fn candela(&self) -> &DMatrix<f64> {
        &self.candela
    }

    pub fn declared_total_flux(&self) -> Lumens {
        self.declared_total_flux
    }

    pub fn metadata(&self) -> &PhotometricMetadata {
        &self.metadata
    }

    /// Present when the header's plane or angle count had to be corrected
    pub fn resynchronization(&self) -> Option<Resynchronization> {
        self.resynchronization
    }

    /// Number of horizontal planes (grid rows)
    pub fn plane_count(&self) -> usize {
        self.candela.nrows()
    }

    /// Number of vertical angles (grid columns)
    pub fn angle_count(&self) -> usize {
        self.candela.ncols()
    }

    /// Mean intensity across all horizontal planes for each vertical angle.
    pub fn mean_intensity(&self) -> Vec<f64> {
        self.candela.row_mean().iter().copied().collect()
    }
}

/// Single-plane intensity curve recovered by the heuristic scan.
///
/// Carries no declared flux and no guarantee that `angles` really is an
/// angle list; it's whatever the first long numeric row happened to be.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntensityProfile {
    /// Candidate vertical angles in degrees
    pub angles: Vec<f64>,
    /// Candela value for each angle
    pub candela: Vec<f64>,
}

impl IntensityProfile {
    /// Lift the curve into a one-plane table with the given total flux.
    ///
    /// # Errors
    /// [`LightingError::Format`] when the curve violates the table
    /// invariants (angles out of range or unordered, negative candela).
    pub fn into_table(self, declared_total_flux: Lumens) -> Result<PhotometricTable> {
        let candela = DMatrix::from_row_slice(1, self.candela.len(), &self.candela);
        PhotometricTable::new(self.angles, vec![0.0], candela, declared_total_flux)
    }
}
