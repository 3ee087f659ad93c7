//! C ABI over the lighting calculation core.
//!
//! Every function returns a [`LumiErrorCode`]; on failure the message is
//! available from `lumicalc_get_last_error` on the same thread. Parsed
//! photometric tables are handed out as opaque [`LumiTable`] pointers owned
//! by the caller.

mod calculations;
mod error;
mod helpers;
mod table;

pub use calculations::{
    lumicalc_achieved_illuminance, lumicalc_maintenance_factor, lumicalc_required_luminaires,
    lumicalc_room_cavity_ratio, lumicalc_utilization_from_room, lumicalc_utilization_from_table,
    LumiUtilization,
};
pub use error::{lumicalc_get_last_error, lumicalc_get_last_error_code, LumiErrorCode};
pub use table::{
    lumicalc_table_declared_flux, lumicalc_table_destroy, lumicalc_table_dimensions,
    lumicalc_table_parse, lumicalc_table_parse_heuristic, lumicalc_table_parse_with, LumiTable,
};
