use crate::error::{with_last_error_mut, DefaultLumiError, LumiError, LumiErrorCode};
use std::ffi::CString;

/// Set the thread-local error message and code.
pub(crate) fn set_last_error(error: &impl LumiError) {
    with_last_error_mut(|(cstring, code)| {
        *cstring = CString::new(error.msg()).ok();
        *code = error.code();
    });
}

/// Record an error in thread-local storage and return its code.
#[inline]
pub(crate) fn track_error(error: &impl LumiError) -> LumiErrorCode {
    set_last_error(error);
    error.code()
}

/// Clear the thread-local error message and code after a successful call.
pub(crate) fn clear_last_error() {
    with_last_error_mut(|(cstring, code)| {
        *cstring = None;
        *code = LumiErrorCode::Ok;
    });
}

/// Record the outcome of a fallible call: the error is tracked, success
/// clears any stale error.
pub(crate) fn track_result<T, E>(result: Result<T, E>) -> Result<T, LumiErrorCode>
where
    E: Into<DefaultLumiError>,
{
    match result {
        Ok(value) => {
            clear_last_error();
            Ok(value)
        }
        Err(error) => Err(track_error(&error.into())),
    }
}

/// Write a successful value through an out pointer already checked for null.
///
/// # Safety
/// `out` must be non-null and valid for writes of `T`.
pub(crate) unsafe fn write_out<T>(
    out: *mut T,
    result: Result<T, DefaultLumiError>,
) -> LumiErrorCode {
    match track_result(result) {
        Ok(value) => {
            unsafe {
                *out = value;
            }
            LumiErrorCode::Ok
        }
        Err(code) => code,
    }
}

/// Reject a null pointer argument, recording the parameter name.
pub(crate) fn require_non_null<T>(ptr: *const T, param_name: &str) -> Result<(), LumiErrorCode> {
    if ptr.is_null() {
        Err(track_error(&DefaultLumiError::null_pointer(param_name)))
    } else {
        Ok(())
    }
}
