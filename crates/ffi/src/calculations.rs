use lumicalc_core::maintenance::maintenance_factor_from_ordinals;
use lumicalc_core::utilization::from_photometry_with_flux;
use lumicalc_core::{
    achieved_illuminance, estimate_from_room, required_luminaires, Lumens, Lux, Meters,
    RoomGeometry, SquareMeters, SurfaceReflectances, UtilizationResult,
};

use crate::error::{DefaultLumiError, LumiErrorCode};
use crate::helpers::{require_non_null, write_out};
use crate::table::LumiTable;

/// C-compatible utilization result.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LumiUtilization {
    /// Flux reaching the working plane (lm).
    pub useful_flux: f64,
    /// Flux the coefficient is relative to (lm).
    pub total_flux: f64,
    /// `useful_flux / total_flux`, unclamped.
    pub coefficient: f64,
}

impl From<UtilizationResult> for LumiUtilization {
    fn from(result: UtilizationResult) -> Self {
        Self {
            useful_flux: *result.useful_flux,
            total_flux: *result.total_flux,
            coefficient: result.coefficient,
        }
    }
}

/// Utilization coefficient integrated from a parsed table.
///
/// # Parameters
/// - `total_flux`: flux the coefficient is relative to; pass a value `<= 0`
///   to use the table's declared flux instead
///
/// Returns
/// - `LumiErrorCode::Ok` - `out_result` populated
/// - `LumiErrorCode::NullPointer` - `table` or `out_result` is null
/// - `LumiErrorCode::InvalidParameter` - `total_flux` is NaN or infinite
/// - `LumiErrorCode::Domain` - the flux in use is not positive
///
/// # Safety
/// `table` must be a live handle; `out_result` must be a valid, non-null
/// pointer to writable memory.
#[no_mangle]
pub unsafe extern "C" fn lumicalc_utilization_from_table(
    table: *const LumiTable,
    total_flux: f64,
    out_result: *mut LumiUtilization,
) -> LumiErrorCode {
    if let Err(code) =
        require_non_null(table, "table").and_then(|()| require_non_null(out_result, "out_result"))
    {
        return code;
    }

    if !total_flux.is_finite() {
        let err = DefaultLumiError::invalid_parameter(
            "total_flux",
            &format!("must be finite, got {total_flux}"),
        );
        return unsafe { write_out::<LumiUtilization>(out_result, Err(err)) };
    }

    unsafe {
        let table = &(*table).table;
        let flux = if total_flux > 0.0 {
            Lumens::new(total_flux)
        } else {
            table.declared_total_flux()
        };
        let result = from_photometry_with_flux(table, flux)
            .map(LumiUtilization::from)
            .map_err(DefaultLumiError::from);
        write_out(out_result, result)
    }
}

/// Utilization coefficient estimated from the room cavity ratio and the
/// ceiling, wall and floor reflectances (each in [0, 1]).
///
/// # Safety
/// `out_coefficient` must be a valid, non-null pointer to writable memory.
#[no_mangle]
pub unsafe extern "C" fn lumicalc_utilization_from_room(
    room_cavity_ratio: f64,
    ceiling: f64,
    walls: f64,
    floor: f64,
    out_coefficient: *mut f64,
) -> LumiErrorCode {
    if let Err(code) = require_non_null(out_coefficient, "out_coefficient") {
        return code;
    }

    let reflectances = SurfaceReflectances::new(ceiling, walls, floor);
    let result = estimate_from_room(room_cavity_ratio, reflectances).map_err(DefaultLumiError::from);
    unsafe { write_out(out_coefficient, result) }
}

/// Room cavity ratio `5·h·(L + W) / A`, zero for a degenerate room.
///
/// # Safety
/// `out_rcr` must be a valid, non-null pointer to writable memory.
#[no_mangle]
pub unsafe extern "C" fn lumicalc_room_cavity_ratio(
    length: f64,
    width: f64,
    mounting_height: f64,
    work_plane_height: f64,
    out_rcr: *mut f64,
) -> LumiErrorCode {
    if let Err(code) = require_non_null(out_rcr, "out_rcr") {
        return code;
    }

    let room = RoomGeometry::new(
        Meters::new(length),
        Meters::new(width),
        Meters::new(mounting_height),
        Meters::new(work_plane_height),
    );
    unsafe { write_out(out_rcr, Ok(room.room_cavity_ratio())) }
}

/// Maintenance factor after `months` in service.
///
/// # Parameters
/// - `category`: luminaire maintenance category, 1 (I) to 6 (VI)
/// - `condition`: atmosphere, 1 (very clean) to 5 (very dirty)
///
/// Returns
/// - `LumiErrorCode::InvalidSelection` - ordinal out of range
/// - `LumiErrorCode::Domain` - negative or non-finite `months`
///
/// # Safety
/// `out_factor` must be a valid, non-null pointer to writable memory.
#[no_mangle]
pub unsafe extern "C" fn lumicalc_maintenance_factor(
    category: u8,
    condition: u8,
    months: f64,
    out_factor: *mut f64,
) -> LumiErrorCode {
    if let Err(code) = require_non_null(out_factor, "out_factor") {
        return code;
    }

    let result =
        maintenance_factor_from_ordinals(category, condition, months).map_err(DefaultLumiError::from);
    unsafe { write_out(out_factor, result) }
}

/// Smallest luminaire count reaching `target_lux` on average.
///
/// Returns `LumiErrorCode::Domain` when the area or target is not positive
/// or `flux · coefficient · maintenance_factor` is not positive.
///
/// # Safety
/// `out_count` must be a valid, non-null pointer to writable memory.
#[no_mangle]
pub unsafe extern "C" fn lumicalc_required_luminaires(
    area: f64,
    target_lux: f64,
    flux: f64,
    coefficient: f64,
    maintenance_factor: f64,
    out_count: *mut u32,
) -> LumiErrorCode {
    if let Err(code) = require_non_null(out_count, "out_count") {
        return code;
    }

    let result = required_luminaires(
        SquareMeters::new(area),
        Lux::new(target_lux),
        Lumens::new(flux),
        coefficient,
        maintenance_factor,
    )
    .map_err(DefaultLumiError::from);
    unsafe { write_out(out_count, result) }
}

/// Average illuminance delivered by `count` luminaires.
///
/// Returns `LumiErrorCode::Domain` when the area is not positive.
///
/// # Safety
/// `out_lux` must be a valid, non-null pointer to writable memory.
#[no_mangle]
pub unsafe extern "C" fn lumicalc_achieved_illuminance(
    count: u32,
    flux: f64,
    coefficient: f64,
    maintenance_factor: f64,
    area: f64,
    out_lux: *mut f64,
) -> LumiErrorCode {
    if let Err(code) = require_non_null(out_lux, "out_lux") {
        return code;
    }

    let result = achieved_illuminance(
        count,
        Lumens::new(flux),
        coefficient,
        maintenance_factor,
        SquareMeters::new(area),
    )
    .map(|lux| *lux)
    .map_err(DefaultLumiError::from);
    unsafe { write_out(out_lux, result) }
}
