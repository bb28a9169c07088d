//! Boundary to the Go binary analysis engine.
//!
//! The engine keeps one analysis state per opened path and hands out flat
//! records that stay valid until that path is closed. [`Engine`] is the only
//! way the rest of the crate reaches it.

pub mod abi;
#[cfg(feature = "libgore")]
pub mod libgore;

use std::ffi::CStr;
use std::os::raw::{c_char, c_int};

use crate::core::package::PackageClass;
use abi::{RawCompilerVersion, RawPackages, RawTypes};

/// The foreign analysis engine, one method per entry point.
///
/// Every call takes the path the analysis was opened with as its key.
///
/// # Safety
///
/// Implementors guarantee that every pointer returned for `path` is either
/// null or points to well-formed records laid out as described in [`abi`],
/// including every pointer reachable from them, and that this memory stays
/// valid and unmodified until `close(path)` is called. Status-returning calls
/// return nonzero on success.
pub unsafe trait Engine: Send + Sync {
    /// Load and analyze the binary at `path`.
    fn open(&self, path: &CStr) -> c_int;

    /// Release every resource held for `path`.
    fn close(&self, path: &CStr);

    /// Ask the engine to assume `version` when its own detection is inconclusive.
    /// Nonzero means accepted, as libgore's `gore_setGoVersion` reports it.
    fn set_go_version(&self, path: &CStr, version: &CStr) -> c_int;

    fn compiler_version(&self, path: &CStr) -> *const RawCompilerVersion;

    /// Packages the engine placed in `class`.
    fn packages(&self, path: &CStr, class: PackageClass) -> *const RawPackages;

    fn types(&self, path: &CStr) -> *const RawTypes;

    fn build_id(&self, path: &CStr) -> *const c_char;
}
