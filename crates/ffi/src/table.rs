use lumicalc_core::photometry::{parse_heuristic, parse_with};
use lumicalc_core::{FluxSource, Lumens, ParseOptions, PhotometricTable, ResyncPolicy};
use std::{ptr, slice};

use crate::error::{DefaultLumiError, LumiErrorCode};
use crate::helpers::{require_non_null, track_result, write_out};

/// Opaque handle to a parsed photometric table.
///
/// Created by `lumicalc_table_parse`, `lumicalc_table_parse_with` or
/// `lumicalc_table_parse_heuristic`, released with `lumicalc_table_destroy`. Tables are immutable once built,
/// so a handle may be read from several threads at once.
pub struct LumiTable {
    pub(crate) table: PhotometricTable,
}

impl LumiTable {
    fn from_structured(bytes: &[u8], options: ParseOptions) -> Result<Box<Self>, DefaultLumiError> {
        Ok(Box::new(Self {
            table: parse_with(bytes, options)?,
        }))
    }

    fn from_heuristic(bytes: &[u8], total_flux: f64) -> Result<Box<Self>, DefaultLumiError> {
        if !total_flux.is_finite() {
            return Err(DefaultLumiError::invalid_parameter(
                "total_flux",
                &format!("must be finite, got {total_flux}"),
            ));
        }
        let profile = parse_heuristic(bytes)?;
        Ok(Box::new(Self {
            table: profile.into_table(Lumens::new(total_flux))?,
        }))
    }
}

/// Borrow the caller's byte buffer.
///
/// # Safety
/// `data` must be non-null and valid for reads of `len` bytes.
unsafe fn borrow_bytes<'a>(data: *const u8, len: usize) -> &'a [u8] {
    unsafe { slice::from_raw_parts(data, len) }
}

/// Shared tail of both constructors: publish the handle or null it out.
///
/// # Safety
/// `out_table` must be non-null and valid for writes.
unsafe fn publish(
    out_table: *mut *mut LumiTable,
    result: Result<Box<LumiTable>, DefaultLumiError>,
) -> LumiErrorCode {
    match track_result(result) {
        Ok(table) => {
            unsafe {
                *out_table = Box::into_raw(table);
            }
            LumiErrorCode::Ok
        }
        Err(code) => {
            unsafe {
                *out_table = ptr::null_mut();
            }
            code
        }
    }
}

/// Parse an LM-63 photometric file held in memory.
///
/// The bytes are decoded as ISO-8859-1, so any byte sequence is accepted
/// as text; only the file structure can fail.
///
/// Returns
/// - `LumiErrorCode::Ok` - `out_table` holds a new handle
/// - `LumiErrorCode::NullPointer` - `data` or `out_table` is null
/// - `LumiErrorCode::Format` - missing tilt marker, bad header, or
///   irreconcilable candela count (`out_table` set to null)
///
/// # Safety
/// - `data` must point to `len` readable bytes.
/// - `out_table` must be a valid, non-null pointer to writable memory.
/// - The caller owns the returned handle and MUST release it with
///   `lumicalc_table_destroy` exactly once.
#[no_mangle]
pub unsafe extern "C" fn lumicalc_table_parse(
    data: *const u8,
    len: usize,
    out_table: *mut *mut LumiTable,
) -> LumiErrorCode {
    if let Err(code) = require_non_null(out_table, "out_table") {
        return code;
    }
    if let Err(code) = require_non_null(data, "data") {
        unsafe {
            *out_table = ptr::null_mut();
        }
        return code;
    }

    unsafe {
        let bytes = borrow_bytes(data, len);
        publish(out_table, LumiTable::from_structured(bytes, ParseOptions::default()))
    }
}

/// Decode the resync and flux-source selectors of `lumicalc_table_parse_with`.
fn parse_options(resync: u8, flux_source: u8) -> Result<ParseOptions, DefaultLumiError> {
    let resync = match resync {
        0 => ResyncPolicy::PlanesFirst,
        1 => ResyncPolicy::AnglesFirst,
        2 => ResyncPolicy::Reject,
        other => {
            return Err(DefaultLumiError::invalid_parameter(
                "resync",
                &format!("expected 0, 1 or 2, got {other}"),
            ));
        }
    };
    let flux_source = match flux_source {
        0 => FluxSource::Header,
        1 => FluxSource::HeaderOrAnnotation,
        other => {
            return Err(DefaultLumiError::invalid_parameter(
                "flux_source",
                &format!("expected 0 or 1, got {other}"),
            ));
        }
    };
    Ok(ParseOptions {
        resync,
        flux_source,
    })
}

/// Parse an LM-63 photometric file with explicit parser options.
///
/// # Parameters
/// - `resync`: how a candela count that disagrees with the declared grid is
///   repaired: 0 = recompute planes first, 1 = recompute angles first,
///   2 = reject the file
/// - `flux_source`: 0 = header lumens only, 1 = fall back to a `<n> lm`
///   annotation in the keyword section when the header declares none
///
/// Returns
/// - `LumiErrorCode::Ok` - `out_table` holds a new handle
/// - `LumiErrorCode::NullPointer` - `data` or `out_table` is null
/// - `LumiErrorCode::InvalidParameter` - unknown `resync` or `flux_source`
/// - `LumiErrorCode::Format` - as for `lumicalc_table_parse`, plus any
///   count mismatch under `resync = 2`
///
/// # Safety
/// Same contract as `lumicalc_table_parse`.
#[no_mangle]
pub unsafe extern "C" fn lumicalc_table_parse_with(
    data: *const u8,
    len: usize,
    resync: u8,
    flux_source: u8,
    out_table: *mut *mut LumiTable,
) -> LumiErrorCode {
    if let Err(code) = require_non_null(out_table, "out_table") {
        return code;
    }
    if let Err(code) = require_non_null(data, "data") {
        unsafe {
            *out_table = ptr::null_mut();
        }
        return code;
    }

    unsafe {
        let bytes = borrow_bytes(data, len);
        let result = parse_options(resync, flux_source)
            .and_then(|options| LumiTable::from_structured(bytes, options));
        publish(out_table, result)
    }
}

/// Recover a single-plane table from a freeform numeric file.
///
/// The first two numeric rows with more than ten values are taken as the
/// angle and candela lists. `total_flux` becomes the table's declared flux
/// since freeform files carry none.
///
/// Returns
/// - `LumiErrorCode::Ok` - `out_table` holds a new handle
/// - `LumiErrorCode::NullPointer` - `data` or `out_table` is null
/// - `LumiErrorCode::InvalidParameter` - `total_flux` is not finite
/// - `LumiErrorCode::Format` - fewer than two qualifying rows, or the rows
///   do not form a valid curve
///
/// # Safety
/// Same contract as `lumicalc_table_parse`.
#[no_mangle]
pub unsafe extern "C" fn lumicalc_table_parse_heuristic(
    data: *const u8,
    len: usize,
    total_flux: f64,
    out_table: *mut *mut LumiTable,
) -> LumiErrorCode {
    if let Err(code) = require_non_null(out_table, "out_table") {
        return code;
    }
    if let Err(code) = require_non_null(data, "data") {
        unsafe {
            *out_table = ptr::null_mut();
        }
        return code;
    }

    unsafe {
        let bytes = borrow_bytes(data, len);
        publish(out_table, LumiTable::from_heuristic(bytes, total_flux))
    }
}

/// Release a table handle. Null is a no-op.
///
/// # Safety
/// - The pointer MUST have come from one of the `lumicalc_table_parse*`
///   constructors and not have been released already.
/// - The caller must not use the pointer afterwards.
#[no_mangle]
pub unsafe extern "C" fn lumicalc_table_destroy(table: *mut LumiTable) {
    if table.is_null() {
        return;
    }

    // SAFETY: created by `Box::into_raw` in `publish` and not yet released
    unsafe {
        drop(Box::from_raw(table));
    }
}

/// Number of horizontal planes and vertical angles of the grid.
///
/// # Safety
/// `table` must be a live handle; `out_planes` and `out_angles` must be
/// valid, non-null pointers to writable memory.
#[no_mangle]
pub unsafe extern "C" fn lumicalc_table_dimensions(
    table: *const LumiTable,
    out_planes: *mut usize,
    out_angles: *mut usize,
) -> LumiErrorCode {
    if let Err(code) = require_non_null(table, "table")
        .and_then(|()| require_non_null(out_planes, "out_planes"))
        .and_then(|()| require_non_null(out_angles, "out_angles"))
    {
        return code;
    }

    unsafe {
        let table = &(*table).table;
        *out_angles = table.angle_count();
        write_out(out_planes, Ok(table.plane_count()))
    }
}

/// Total flux declared by the file, as read (may be `-1` for absolute
/// photometry).
///
/// # Safety
/// `table` must be a live handle; `out_flux` must be a valid, non-null
/// pointer to writable memory.
#[no_mangle]
pub unsafe extern "C" fn lumicalc_table_declared_flux(
    table: *const LumiTable,
    out_flux: *mut f64,
) -> LumiErrorCode {
    if let Err(code) =
        require_non_null(table, "table").and_then(|()| require_non_null(out_flux, "out_flux"))
    {
        return code;
    }

    unsafe { write_out(out_flux, Ok(*(*table).table.declared_total_flux())) }
}
