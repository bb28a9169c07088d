//! Single-record conversions: compiler version and build id.

use std::os::raw::c_char;

use crate::core::compiler::CompilerVersion;
use crate::ffi::abi::{decode_text, record_ref, RawCompilerVersion};

/// Copy the compiler version record, `None` when the engine returned none.
///
/// # Safety
///
/// `raw` must be null or valid per the [`Engine`](crate::ffi::Engine) contract.
pub(crate) unsafe fn compiler_version(raw: *const RawCompilerVersion) -> Option<CompilerVersion> {
    let cv = record_ref(raw)?;
    Some(CompilerVersion {
        name: decode_text(cv.name),
        sha: decode_text(cv.sha),
        timestamp: decode_text(cv.timestamp),
    })
}

/// Copy the build id; empty when unavailable.
///
/// # Safety
///
/// `raw` must be null or a NUL-terminated string.
pub(crate) unsafe fn build_id(raw: *const c_char) -> String {
    decode_text(raw)
}
