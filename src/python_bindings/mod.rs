//! Python bindings for gorekit.
//!
//! Mirrors the classic Python API: a `GoFile` opened on a path with
//! `get_*` methods and an explicit `close()`.

use pyo3::prelude::*;

mod types;

pub use types::{PyGoType, PyStructField, PyTypeGraph, PyTypeMethod};

use crate::core::{ChanDir, CompilerVersion, Function, Method, Package, PackageClass, TypeKind};
use crate::session::GoFile;

/// Register all Python bindings with the module.
pub fn register_python_bindings(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyGoFile>()?;
    m.add_class::<PyTypeGraph>()?;
    m.add_class::<PyGoType>()?;
    m.add_class::<PyStructField>()?;
    m.add_class::<PyTypeMethod>()?;
    m.add_class::<CompilerVersion>()?;
    m.add_class::<Function>()?;
    m.add_class::<Method>()?;
    m.add_class::<Package>()?;
    m.add_class::<PackageClass>()?;
    m.add_class::<TypeKind>()?;
    m.add_class::<ChanDir>()?;
    m.add_function(wrap_pyfunction!(crate::logging::init_logging, m)?)?;
    Ok(())
}

/// A Go binary opened for analysis.
#[pyclass(name = "GoFile", unsendable)]
pub struct PyGoFile {
    inner: GoFile,
}

#[pymethods]
impl PyGoFile {
    #[new]
    fn new(path: String) -> PyResult<Self> {
        Ok(Self {
            inner: GoFile::open(path)?,
        })
    }

    /// Release the engine memory held for this file.
    fn close(&mut self) -> PyResult<()> {
        Ok(self.inner.close()?)
    }

    #[getter]
    fn path(&self) -> Option<String> {
        self.inner.path().map(str::to_string)
    }

    fn set_compiler_version(&self, version: &str) -> PyResult<bool> {
        Ok(self.inner.set_compiler_version(version)?)
    }

    fn get_compiler_version(&self) -> PyResult<Option<CompilerVersion>> {
        Ok(self.inner.compiler_version()?)
    }

    fn get_packages(&self) -> PyResult<Vec<Package>> {
        Ok(self.inner.project_packages()?)
    }

    fn get_vendor_packages(&self) -> PyResult<Vec<Package>> {
        Ok(self.inner.vendor_packages()?)
    }

    fn get_std_lib_packages(&self) -> PyResult<Vec<Package>> {
        Ok(self.inner.std_packages()?)
    }

    fn get_unknown_packages(&self) -> PyResult<Vec<Package>> {
        Ok(self.inner.unknown_packages()?)
    }

    /// Every reported type, as navigable `Type` objects.
    fn get_types(&self) -> PyResult<Vec<PyGoType>> {
        Ok(PyTypeGraph::new(self.inner.types()?).entries())
    }

    /// The same types with lookups by address and name.
    fn get_type_graph(&self) -> PyResult<PyTypeGraph> {
        Ok(PyTypeGraph::new(self.inner.types()?))
    }

    fn get_build_id(&self) -> PyResult<String> {
        Ok(self.inner.build_id()?)
    }

    fn __repr__(&self) -> String {
        match self.inner.path() {
            Some(p) => format!("GoFile({p:?})"),
            None => "GoFile(<closed>)".to_string(),
        }
    }
}
