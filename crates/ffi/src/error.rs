use lumicalc_core::LightingError;
use std::cell::RefCell;
use std::ffi::CString;
use std::os::raw::c_char;
use std::ptr;

/// Common interface for errors crossing the FFI boundary.
///
/// - `code()` - the code returned to the caller
/// - `msg()` - the diagnostic kept for `lumicalc_get_last_error`
pub(crate) trait LumiError {
    fn code(&self) -> LumiErrorCode;

    fn msg(&self) -> &str;
}

/// Error raised by the FFI layer itself or converted from the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DefaultLumiError {
    code: LumiErrorCode,
    msg: String,
}

impl DefaultLumiError {
    /// Null pointer passed where a non-null one is required.
    ///
    /// # Arguments
    /// * `param_name` - The parameter that was null (e.g., `"out_table"`)
    pub fn null_pointer(param_name: &str) -> Self {
        Self {
            code: LumiErrorCode::NullPointer,
            msg: format!("Parameter '{param_name}' cannot be null"),
        }
    }

    /// Argument rejected before reaching the core.
    pub fn invalid_parameter(param_name: &str, message: &str) -> Self {
        Self {
            code: LumiErrorCode::InvalidParameter,
            msg: format!("Parameter '{param_name}': {message}"),
        }
    }
}

impl LumiError for DefaultLumiError {
    fn code(&self) -> LumiErrorCode {
        self.code
    }

    fn msg(&self) -> &str {
        &self.msg
    }
}

impl From<&LightingError> for DefaultLumiError {
    fn from(error: &LightingError) -> Self {
        let code = match error {
            LightingError::Format { .. } => LumiErrorCode::Format,
            LightingError::InvalidSelection { .. } => LumiErrorCode::InvalidSelection,
            LightingError::Domain { .. } => LumiErrorCode::Domain,
        };
        Self {
            code,
            msg: error.to_string(),
        }
    }
}

impl From<LightingError> for DefaultLumiError {
    fn from(error: LightingError) -> Self {
        Self::from(&error)
    }
}

/// FFI error codes returned by lighting calculation functions.
/// Follows standard C convention: 0 = success, non-zero = error.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LumiErrorCode {
    /// Operation completed successfully.
    Ok = 0,

    /// Invalid pointer: null pointer passed where non-null required.
    NullPointer = 1,

    /// Invalid parameter passed to function.
    InvalidParameter = 2,

    /// Photometric data lacks mandatory structure or has unparsable numbers.
    Format = 3,

    /// Maintenance category or atmosphere ordinal out of range.
    InvalidSelection = 4,

    /// A calculation precondition was violated (e.g. zero area, negative time).
    Domain = 5,
}

thread_local! {
    /// Most recent FFI error on this thread (C string, error code).
    /// The `CString` is owned here so borrowed pointers handed out by
    /// `lumicalc_get_last_error` stay valid until the next failing call.
    static LAST_ERROR: RefCell<(Option<CString>, LumiErrorCode)> = const { RefCell::new((None, LumiErrorCode::Ok)) };
}

pub(crate) fn with_last_error<F, R>(f: F) -> R
where
    F: FnOnce(&(Option<CString>, LumiErrorCode)) -> R,
{
    LAST_ERROR.with_borrow(f)
}

pub(crate) fn with_last_error_mut<F, R>(f: F) -> R
where
    F: FnOnce(&mut (Option<CString>, LumiErrorCode)) -> R,
{
    LAST_ERROR.with_borrow_mut(f)
}

/// Retrieve the most recent FFI error message as a null-terminated C string.
///
/// Returns:
/// - A borrowed pointer to the error message if the last call on this thread failed.
/// - `null` if the last call succeeded or the message cannot be converted to a C string.
///
/// # Thread Safety
/// Error state is per-thread. Each thread sees only its own failures.
///
/// # Lifetime
/// The returned pointer is valid until the next `lumicalc_*` call on this
/// thread. **DO NOT FREE THIS POINTER** - it is managed internally.
///
/// Example:
/// ```c
/// LumiTable* table = NULL;
/// if (lumicalc_table_parse(bytes, len, &table) != Ok) {
///     const char* error = lumicalc_get_last_error();
///     if (error) {
///         fprintf(stderr, "could not read photometry: %s\n", error);
///     }
/// }
/// ```
#[no_mangle]
pub extern "C" fn lumicalc_get_last_error() -> *const c_char {
    with_last_error(|(cstring, _code)| cstring.as_ref().map_or(ptr::null(), |cs| cs.as_ptr()))
}

/// Retrieve the most recent FFI error code on this thread.
///
/// Returns `LumiErrorCode::Ok` (0) if the last call succeeded.
#[no_mangle]
pub extern "C" fn lumicalc_get_last_error_code() -> LumiErrorCode {
    with_last_error(|(_cstring, code)| *code)
}
