//! Package and symbol reconstruction.
//!
//! Packages and their symbols are independent records, so this is a single
//! pass that copies every field. Records with empty or missing names are kept.

use tracing::{debug, warn};

use crate::core::package::{Function, Method, Package};
use crate::ffi::abi::{
    decode_text, record_ref, record_slice, RawFunction, RawMethod, RawPackage, RawPackages,
};

/// Copy a package array.
///
/// # Safety
///
/// `raw` must be null or valid per the [`Engine`](crate::ffi::Engine) contract.
pub(crate) unsafe fn packages(raw: *const RawPackages) -> Vec<Package> {
    let Some(pps) = record_ref(raw) else {
        debug!("Engine returned no package array");
        return Vec::new();
    };

    let records = record_slice(pps.packages, pps.length);
    let mut out = Vec::with_capacity(records.len());
    for (i, p) in records.iter().enumerate() {
        match record_ref(*p) {
            Some(p) => out.push(package(p)),
            None => warn!(index = i, "Skipping null package record"),
        }
    }
    out
}

unsafe fn package(raw: &RawPackage) -> Package {
    let functions = record_slice(raw.functions, raw.num_funcs)
        .iter()
        .filter_map(|f| record_ref(*f))
        .map(|f| function(f))
        .collect::<Vec<_>>();
    let methods = record_slice(raw.methods, raw.num_meths)
        .iter()
        .filter_map(|m| record_ref(*m))
        .map(|m| method(m))
        .collect::<Vec<_>>();

    let pkg = Package {
        name: decode_text(raw.name),
        filepath: decode_text(raw.filepath),
        functions,
        methods,
    };
    if pkg.functions.len() != raw.num_funcs as usize || pkg.methods.len() != raw.num_meths as usize
    {
        warn!(
            package = %pkg.name,
            functions = raw.num_funcs,
            methods = raw.num_meths,
            "Package has null symbol records"
        );
    }
    pkg
}

unsafe fn function(raw: &RawFunction) -> Function {
    Function {
        name: decode_text(raw.name),
        line_count: raw.src_line_length,
        line_start: raw.src_line_start,
        line_end: raw.src_line_end,
        offset: raw.offset,
        end: raw.end,
        file_name: decode_text(raw.file_name),
        package_name: decode_text(raw.package_name),
    }
}

unsafe fn method(raw: &RawMethod) -> Method {
    let receiver = decode_text(raw.receiver);
    let function = match record_ref(raw.function) {
        Some(f) => function(f),
        None => {
            warn!(receiver = %receiver, "Method record has no function record");
            Function::default()
        }
    };
    Method { receiver, function }
}
