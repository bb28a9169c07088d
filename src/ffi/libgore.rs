//! The engine as exported by `libgore`.

use std::ffi::CStr;
use std::os::raw::{c_char, c_int};
use std::sync::Arc;

use once_cell::sync::OnceCell;

use super::abi::{RawCompilerVersion, RawPackages, RawTypes};
use super::Engine;
use crate::core::package::PackageClass;

#[link(name = "gore")]
extern "C" {
    fn gore_open(path: *const c_char) -> c_int;
    fn gore_close(path: *const c_char);
    #[link_name = "gore_setGoVersion"]
    fn gore_set_go_version(path: *const c_char, version: *const c_char) -> c_int;
    #[link_name = "gore_getCompilerVersion"]
    fn gore_get_compiler_version(path: *const c_char) -> *mut RawCompilerVersion;
    #[link_name = "gore_getPackages"]
    fn gore_get_packages(path: *const c_char) -> *mut RawPackages;
    #[link_name = "gore_getVendors"]
    fn gore_get_vendors(path: *const c_char) -> *mut RawPackages;
    #[link_name = "gore_getSTDLib"]
    fn gore_get_std_lib(path: *const c_char) -> *mut RawPackages;
    #[link_name = "gore_getUnknown"]
    fn gore_get_unknown(path: *const c_char) -> *mut RawPackages;
    #[link_name = "gore_getTypes"]
    fn gore_get_types(path: *const c_char) -> *mut RawTypes;
    fn gore_build_id(path: *const c_char) -> *mut c_char;
}

/// Handle on the linked `libgore` library.
#[derive(Debug)]
pub struct LibGore {
    _private: (),
}

static SHARED: OnceCell<Arc<LibGore>> = OnceCell::new();

impl LibGore {
    /// The process-wide engine. The library keeps global per-path state, so
    /// there is exactly one.
    pub fn shared() -> Arc<dyn Engine> {
        SHARED
            .get_or_init(|| Arc::new(LibGore { _private: () }))
            .clone()
    }
}

// SAFETY: libgore keeps every record it returns for a path alive until
// gore_close is called on that path.
unsafe impl Engine for LibGore {
    fn open(&self, path: &CStr) -> c_int {
        unsafe { gore_open(path.as_ptr()) }
    }

    fn close(&self, path: &CStr) {
        unsafe { gore_close(path.as_ptr()) }
    }

    fn set_go_version(&self, path: &CStr, version: &CStr) -> c_int {
        unsafe { gore_set_go_version(path.as_ptr(), version.as_ptr()) }
    }

    fn compiler_version(&self, path: &CStr) -> *const RawCompilerVersion {
        unsafe { gore_get_compiler_version(path.as_ptr()) }
    }

    fn packages(&self, path: &CStr, class: PackageClass) -> *const RawPackages {
        let path = path.as_ptr();
        unsafe {
            match class {
                PackageClass::Project => gore_get_packages(path),
                PackageClass::Vendor => gore_get_vendors(path),
                PackageClass::Std => gore_get_std_lib(path),
                PackageClass::Unknown => gore_get_unknown(path),
            }
        }
    }

    fn types(&self, path: &CStr) -> *const RawTypes {
        unsafe { gore_get_types(path.as_ptr()) }
    }

    fn build_id(&self, path: &CStr) -> *const c_char {
        unsafe { gore_build_id(path.as_ptr()) }
    }
}
