//! Minimum average illuminance by task area (NOM-025-STPS-2008)

use crate::core_types::Lux;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Task area classes with a prescribed minimum illuminance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum WorkArea {
    OfficeWork,
    Classroom,
    Circulation,
    Exterior,
    ArchiveOrLibrary,
    Reception,
    StairsAndRamps,
    DetailedProduction,
    InspectionOrPrecision,
    /// Any other area; the caller states the level
    Custom(Lux),
}

impl WorkArea {
    /// Every class with a prescribed level, in presentation order.
    pub const PRESCRIBED: [WorkArea; 9] = [
        WorkArea::OfficeWork,
        WorkArea::Classroom,
        WorkArea::Circulation,
        WorkArea::Exterior,
        WorkArea::ArchiveOrLibrary,
        WorkArea::Reception,
        WorkArea::StairsAndRamps,
        WorkArea::DetailedProduction,
        WorkArea::InspectionOrPrecision,
    ];

    pub fn required_illuminance(&self) -> Lux {
        match self {
            Self::OfficeWork | Self::Classroom => Lux::new(300.0),
            Self::Circulation => Lux::new(100.0),
            Self::Exterior => Lux::new(20.0),
            Self::ArchiveOrLibrary => Lux::new(200.0),
            Self::Reception | Self::StairsAndRamps => Lux::new(150.0),
            Self::DetailedProduction => Lux::new(500.0),
            Self::InspectionOrPrecision => Lux::new(750.0),
            Self::Custom(lux) => *lux,
        }
    }
}

impl fmt::Display for WorkArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::OfficeWork => "office work area",
            Self::Classroom => "classroom",
            Self::Circulation => "circulation areas and corridors",
            Self::Exterior => "exterior areas",
            Self::ArchiveOrLibrary => "archives and libraries",
            Self::Reception => "reception areas",
            Self::StairsAndRamps => "stairs and ramps",
            Self::DetailedProduction => "production areas (detailed)",
            Self::InspectionOrPrecision => "inspection or precision areas",
            Self::Custom(_) => "custom area",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prescribed_levels() {
        assert_eq!(WorkArea::OfficeWork.required_illuminance(), Lux::new(300.0));
        assert_eq!(WorkArea::Exterior.required_illuminance(), Lux::new(20.0));
        assert_eq!(
            WorkArea::InspectionOrPrecision.required_illuminance(),
            Lux::new(750.0)
        );
        assert!(WorkArea::PRESCRIBED
            .iter()
            .all(|a| *a.required_illuminance() > 0.0));
    }

    #[test]
    fn test_custom_level_passes_through() {
        assert_eq!(
            WorkArea::Custom(Lux::new(200.0)).required_illuminance(),
            Lux::new(200.0)
        );
    }
}
