//! Lighting Calculation Core Library
//!
//! Sizing of interior lighting installations by the lumen method, driven by
//! real luminaire photometry where it is available.
//!
//! ## Engines
//!
//! - Photometric parsing: LM-63 (IES) files into a candela grid, plus a
//!   permissive reader for freeform numeric files
//! - Utilization coefficient: integrated from photometry, or estimated from
//!   the room cavity ratio and surface reflectances
//! - Maintenance factor: exponential dirt depreciation by luminaire category
//!   and atmosphere
//! - Sizing: luminaire count for a target illuminance and the inverse
//!
//! [`LightingStudy`] chains all four for a single room.

// Core types and utilities
pub mod core_types;
pub mod error;

// Calculation engines
pub mod illuminance_levels;
pub mod maintenance;
pub mod photometry;
pub mod sizing;
pub mod study;
pub mod utilization;

// Re-export core types
pub use core_types::{Degrees, Lumens, Lux, Meters, Months, SquareMeters, Years};
pub use error::{LightingError, Result};

// Re-export photometry
pub use photometry::{
    parse, parse_heuristic, parse_with, FluxSource, IntensityProfile, ParseOptions,
    PhotometricTable, ResyncPolicy,
};

// Re-export engines
pub use illuminance_levels::WorkArea;
pub use maintenance::{maintenance_factor, AtmosphereCondition, MaintenanceCategory};
pub use sizing::{achieved_illuminance, required_luminaires, SizingResult};
pub use study::{LightingStudy, MaintenanceSelection, StudyReport};
pub use utilization::{
    estimate_from_room, from_photometry, CoefficientSource, RoomGeometry, SurfaceReflectances,
    UtilizationResult,
};
