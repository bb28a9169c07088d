//! Go packages and the functions and methods they contain.

use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::error::{GoreError, Result};

#[cfg(feature = "python-ext")]
use pyo3::prelude::*;

/// How the engine classified a package.
///
/// Every package lands in exactly one class; each class is fetched on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "python-ext", pyclass(eq, eq_int))]
pub enum PackageClass {
    /// Code of the main project
    Project,
    /// Vendored or third-party packages
    Vendor,
    /// Standard library packages
    Std,
    /// Packages the engine could not classify
    Unknown,
}

impl PackageClass {
    pub const ALL: [PackageClass; 4] = [
        PackageClass::Project,
        PackageClass::Vendor,
        PackageClass::Std,
        PackageClass::Unknown,
    ];

    pub fn value(&self) -> &str {
        match self {
            PackageClass::Project => "project",
            PackageClass::Vendor => "vendor",
            PackageClass::Std => "std",
            PackageClass::Unknown => "unknown",
        }
    }
}

impl fmt::Display for PackageClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.value())
    }
}

/// A function recovered from the binary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "python-ext", pyclass(get_all))]
pub struct Function {
    /// Function name
    pub name: String,
    /// Number of source lines
    pub line_count: i32,
    /// First source line
    pub line_start: i32,
    /// Last source line
    pub line_end: i32,
    /// Start of the code in the binary
    pub offset: u64,
    /// End of the code in the binary
    pub end: u64,
    /// Source file the function was compiled from
    pub file_name: String,
    /// Package the function belongs to
    pub package_name: String,
}

impl Function {
    /// Size of the code in bytes.
    pub fn size(&self) -> u64 {
        self.end.saturating_sub(self.offset)
    }

    pub fn address_range(&self) -> Range<u64> {
        self.offset..self.end
    }

    pub fn contains(&self, addr: u64) -> bool {
        self.address_range().contains(&addr)
    }
}

/// A method: a function plus the receiver it is declared on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "python-ext", pyclass(get_all))]
pub struct Method {
    /// Receiver as written, e.g. `(*simpleStruct)`
    pub receiver: String,
    #[serde(flatten)]
    pub function: Function,
}

impl Method {
    pub fn name(&self) -> &str {
        &self.function.name
    }

    pub fn offset(&self) -> u64 {
        self.function.offset
    }

    pub fn end(&self) -> u64 {
        self.function.end
    }

    /// Receiver and name, e.g. `(*simpleStruct).String`.
    pub fn qualified_name(&self) -> String {
        if self.receiver.is_empty() {
            self.function.name.clone()
        } else {
            format!("{}.{}", self.receiver, self.function.name)
        }
    }
}

/// A Go package with its functions and methods.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "python-ext", pyclass(get_all))]
pub struct Package {
    /// Package name
    pub name: String,
    /// Source directory the package was built from
    pub filepath: String,
    pub functions: Vec<Function>,
    pub methods: Vec<Method>,
}

impl Package {
    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.name == name)
    }

    pub fn method(&self, receiver: &str, name: &str) -> Option<&Method> {
        self.methods
            .iter()
            .find(|m| m.receiver == receiver && m.name() == name)
    }

    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| GoreError::Serialization(e.to_string()))
    }
}

#[cfg(feature = "python-ext")]
#[pymethods]
impl Function {
    #[getter]
    fn get_line_length(&self) -> i32 {
        self.line_count
    }

    #[getter]
    fn get_filename(&self) -> String {
        self.file_name.clone()
    }

    fn __repr__(&self) -> String {
        format!(
            "Function(name={:?}, offset={:#x}, end={:#x})",
            self.name, self.offset, self.end
        )
    }
}

#[cfg(feature = "python-ext")]
#[pymethods]
impl Method {
    #[getter]
    fn get_name(&self) -> String {
        self.function.name.clone()
    }

    #[getter]
    fn get_line_length(&self) -> i32 {
        self.function.line_count
    }

    #[getter]
    fn get_line_start(&self) -> i32 {
        self.function.line_start
    }

    #[getter]
    fn get_line_end(&self) -> i32 {
        self.function.line_end
    }

    #[getter]
    fn get_offset(&self) -> u64 {
        self.function.offset
    }

    #[getter]
    fn get_end(&self) -> u64 {
        self.function.end
    }

    #[getter]
    fn get_filename(&self) -> String {
        self.function.file_name.clone()
    }

    #[getter]
    fn get_package_name(&self) -> String {
        self.function.package_name.clone()
    }

    fn __repr__(&self) -> String {
        format!(
            "Method(receiver={:?}, name={:?}, offset={:#x}, end={:#x})",
            self.receiver, self.function.name, self.function.offset, self.function.end
        )
    }
}

#[cfg(feature = "python-ext")]
#[pymethods]
impl Package {
    fn __repr__(&self) -> String {
        format!(
            "Package(name={:?}, filepath={:?}, functions={}, methods={})",
            self.name,
            self.filepath,
            self.functions.len(),
            self.methods.len()
        )
    }
}
