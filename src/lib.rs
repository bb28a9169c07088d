//! Safe access to what a Go binary analysis engine extracts from a binary:
//! compiler version, build id, packages with their functions and methods, and
//! the full graph of declared types.
//!
//! The engine sits behind [`ffi::Engine`]. A [`GoFile`] opens one binary on
//! it, and every extraction copies the engine's flat records into the owned
//! model in [`core`], which outlives the handle.

/// Core data types module
pub mod core;

pub mod config;
pub mod error;
pub mod ffi;
pub mod logging;
mod marshal;
pub mod session;

#[cfg(feature = "python-ext")]
pub mod python_bindings;

pub use config::GoreConfig;
pub use error::{GoreError, Result};
pub use session::GoFile;

#[cfg(feature = "python-ext")]
use pyo3::prelude::*;

/// A Python module implemented in Rust.
#[cfg(feature = "python-ext")]
#[pymodule]
fn gorekit(m: &Bound<'_, PyModule>) -> PyResult<()> {
    python_bindings::register_python_bindings(m)
}
