//! `#[repr(C)]` mirrors of the records the analysis engine hands out.
//!
//! Field order is the engine's declaration order; the layout is implied by
//! it, so none of these structs may be reordered. Collections cross the
//! boundary as an array of record pointers plus a length that cannot be
//! checked independently.

use std::ffi::CStr;
use std::os::raw::{c_char, c_int, c_uint, c_ulong, c_ulonglong};

/// Compiler identity record.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct RawCompilerVersion {
    pub name: *const c_char,
    pub sha: *const c_char,
    pub timestamp: *const c_char,
}

/// Function record.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct RawFunction {
    pub name: *const c_char,
    pub src_line_length: c_int,
    pub src_line_start: c_int,
    pub src_line_end: c_int,
    pub offset: c_ulonglong,
    pub end: c_ulonglong,
    pub file_name: *const c_char,
    pub package_name: *const c_char,
}

/// Method record: a receiver string plus the method's function record.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct RawMethod {
    pub receiver: *const c_char,
    pub function: *mut RawFunction,
}

/// Package record.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct RawPackage {
    pub name: *const c_char,
    pub filepath: *const c_char,
    pub functions: *mut *mut RawFunction,
    pub methods: *mut *mut RawMethod,
    pub num_funcs: c_ulong,
    pub num_meths: c_ulong,
}

/// Array of package records returned by one classification call.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct RawPackages {
    pub packages: *mut *mut RawPackage,
    pub length: c_ulong,
}

/// Method attached to a type.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct RawMethodType {
    pub name: *const c_char,
    pub gotype: *mut RawType,
    pub iface_addr: c_ulonglong,
    pub func_addr: c_ulonglong,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct RawMethodTypes {
    pub methods: *mut *mut RawMethodType,
    pub length: c_ulong,
}

/// Type record. References to other types are plain pointers, and the same
/// type may be reachable through many of them, cycles included; `addr` is
/// the identity that ties them together.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct RawType {
    pub kind: c_uint,
    pub name: *const c_char,
    pub addr: c_ulonglong,
    pub ptr_resolved: c_ulonglong,
    pub package_path: *const c_char,
    pub fields: *mut RawTypes,
    pub field_name: *const c_char,
    pub field_tag: *const c_char,
    pub field_anon: c_int,
    pub element: *mut RawType,
    pub length: c_int,
    pub chan_dir: c_int,
    pub key: *mut RawType,
    pub func_args: *mut RawTypes,
    pub func_returns: *mut RawTypes,
    pub is_variadic: c_int,
    pub methods: *mut RawMethodTypes,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct RawTypes {
    pub types: *mut *mut RawType,
    pub length: c_ulong,
}

/// Decode a NUL-terminated engine string. Null decodes to the empty string
/// and invalid UTF-8 is replaced rather than rejected.
///
/// # Safety
///
/// `ptr` must be null or point to a NUL-terminated string that stays alive
/// for the duration of the call.
pub unsafe fn decode_text(ptr: *const c_char) -> String {
    decode_optional_text(ptr).unwrap_or_default()
}

/// Like [`decode_text`], but keeps a null pointer distinguishable from an
/// empty string.
///
/// # Safety
///
/// Same contract as [`decode_text`].
pub unsafe fn decode_optional_text(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    Some(CStr::from_ptr(ptr).to_string_lossy().into_owned())
}

/// View a (pointer-array, length) pair as a slice of record pointers.
///
/// The reported length is trusted. A null array yields an empty slice.
///
/// # Safety
///
/// `items` must be null or point to at least `len` initialized pointers that
/// outlive `'a`.
pub unsafe fn record_slice<'a, T>(items: *const *mut T, len: c_ulong) -> &'a [*mut T] {
    if items.is_null() || len == 0 {
        return &[];
    }
    std::slice::from_raw_parts(items, len as usize)
}

/// Borrow a record behind a possibly-null pointer.
///
/// # Safety
///
/// `ptr` must be null or point to a valid `T` that outlives `'a`.
pub unsafe fn record_ref<'a, T>(ptr: *const T) -> Option<&'a T> {
    ptr.as_ref()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;
    use std::mem::{align_of, size_of};

    #[test]
    fn test_decode_text_valid_and_null() {
        let s = CString::new("go1.12").unwrap();
        unsafe {
            assert_eq!(decode_text(s.as_ptr()), "go1.12");
            assert_eq!(decode_text(std::ptr::null()), "");
            assert_eq!(decode_optional_text(std::ptr::null()), None);
        }
    }

    #[test]
    fn test_decode_text_replaces_invalid_utf8() {
        let s = CString::new(vec![b'm', b'a', 0xff, b'n']).unwrap();
        let decoded = unsafe { decode_text(s.as_ptr()) };
        assert_eq!(decoded, "ma\u{fffd}n");
    }

    #[test]
    fn test_record_slice_null_and_empty() {
        unsafe {
            let empty: &[*mut RawType] = record_slice(std::ptr::null(), 5);
            assert!(empty.is_empty());

            let mut items = [std::ptr::null_mut::<RawType>(); 2];
            assert!(record_slice(items.as_mut_ptr(), 0).is_empty());
            assert_eq!(record_slice(items.as_mut_ptr(), 2).len(), 2);
        }
    }

    #[test]
    fn test_layout_follows_declaration_order() {
        let ptr = size_of::<*const c_char>();
        assert_eq!(size_of::<RawCompilerVersion>(), 3 * ptr);
        assert_eq!(size_of::<RawMethod>(), 2 * ptr);
        assert_eq!(align_of::<RawType>(), align_of::<c_ulonglong>().max(ptr));
        assert_eq!(
            size_of::<RawPackages>(),
            ptr + size_of::<c_ulong>().max(ptr)
        );
    }
}
