//! Session handle on one analyzed binary.
//!
//! Opening a [`GoFile`] makes the engine load and analyze the binary and keep
//! the results keyed by path. Every extraction reads that state and copies it
//! into owned values. Closing releases the engine state; after that the
//! handle refuses every call, and dropping an open handle closes it.

use std::cell::Cell;
use std::collections::HashSet;
use std::ffi::{CStr, CString};
use std::marker::PhantomData;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use once_cell::sync::Lazy;
use tracing::{debug, info, warn};

use crate::config::GoreConfig;
use crate::core::{CompilerVersion, Package, PackageClass, TypeGraph};
use crate::error::{GoreError, Result};
use crate::ffi::Engine;
use crate::marshal::{metadata, packages, types::TypeGraphBuilder};
use crate::{log_error, span_trace};

/// Paths with a live handle, per engine instance.
static OPEN_PATHS: Lazy<Mutex<HashSet<(usize, CString)>>> =
    Lazy::new(|| Mutex::new(HashSet::new()));

fn open_paths() -> MutexGuard<'static, HashSet<(usize, CString)>> {
    OPEN_PATHS.lock().unwrap_or_else(|e| e.into_inner())
}

fn engine_key(engine: &Arc<dyn Engine>) -> usize {
    Arc::as_ptr(engine) as *const () as usize
}

/// An open Go binary.
///
/// A handle is `Send` but not `Sync`: it may move to another thread, but
/// calls on one handle are never concurrent. Handles on different binaries
/// are independent.
pub struct GoFile {
    path: Option<CString>,
    engine: Arc<dyn Engine>,
    _not_sync: PhantomData<Cell<()>>,
}

impl GoFile {
    /// Open `path` with the linked `libgore` engine.
    #[cfg(feature = "libgore")]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(crate::ffi::libgore::LibGore::shared(), path)
    }

    /// Open `path` with the linked `libgore` engine and `config`.
    #[cfg(feature = "libgore")]
    pub fn open_with_config(path: impl AsRef<Path>, config: &GoreConfig) -> Result<Self> {
        Self::open_with_engine_config(crate::ffi::libgore::LibGore::shared(), path, config)
    }

    /// Open `path` on `engine` with the default configuration.
    pub fn open_with(engine: Arc<dyn Engine>, path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_engine_config(engine, path, &GoreConfig::default())
    }

    pub fn open_with_engine_config(
        engine: Arc<dyn Engine>,
        path: impl AsRef<Path>,
        config: &GoreConfig,
    ) -> Result<Self> {
        let path = path.as_ref();
        let path_str = path
            .to_str()
            .ok_or_else(|| GoreError::InvalidPath(path.to_string_lossy().into_owned()))?;
        let c_path = CString::new(path_str)
            .map_err(|_| GoreError::InvalidPath(path_str.escape_debug().to_string()))?;

        let span = span_trace!("gore.open", path = %path_str);
        let _guard = span.enter();

        let key = (engine_key(&engine), c_path.clone());
        if !open_paths().insert(key.clone()) {
            return Err(GoreError::AlreadyOpen {
                path: path_str.to_string(),
            });
        }

        if engine.open(&c_path) == 0 {
            open_paths().remove(&key);
            return Err(log_error!(
                GoreError::OpenFailed {
                    path: path_str.to_string(),
                },
                "engine could not analyze binary"
            ));
        }

        let file = GoFile {
            path: Some(c_path),
            engine,
            _not_sync: PhantomData,
        };

        if let Some(version) = &config.assumed_go_version {
            if !file.set_compiler_version(version)? {
                if config.require_assumed_version {
                    return Err(GoreError::VersionRejected {
                        version: version.clone(),
                    });
                }
                warn!(version = %version, "Engine rejected assumed compiler version");
            }
        }

        info!("Opened Go binary");
        Ok(file)
    }

    /// Path the handle was opened with, `None` once closed.
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref().and_then(|p| p.to_str().ok())
    }

    pub fn is_open(&self) -> bool {
        self.path.is_some()
    }

    /// Release the engine state for this binary. Values already extracted
    /// stay valid; a second close fails with [`GoreError::SessionClosed`].
    pub fn close(&mut self) -> Result<()> {
        let path = self.path.take().ok_or(GoreError::SessionClosed)?;
        self.engine.close(&path);
        debug!(path = %path.to_string_lossy(), "Closed Go binary");
        open_paths().remove(&(engine_key(&self.engine), path));
        Ok(())
    }

    fn live_path(&self) -> Result<&CStr> {
        self.path.as_deref().ok_or(GoreError::SessionClosed)
    }

    /// Tell the engine which compiler version to assume when its own
    /// detection is inconclusive. Returns whether the engine accepted it.
    pub fn set_compiler_version(&self, version: &str) -> Result<bool> {
        let path = self.live_path()?;
        let c_version = CString::new(version)
            .map_err(|_| GoreError::InvalidInput(format!("compiler version {version:?}")))?;
        let accepted = self.engine.set_go_version(path, &c_version) != 0;
        debug!(version = %version, accepted, "Set assumed compiler version");
        Ok(accepted)
    }

    /// Compiler that built the binary, `None` if the engine found none.
    pub fn compiler_version(&self) -> Result<Option<CompilerVersion>> {
        let path = self.live_path()?;
        let _span = span_trace!("gore.compiler_version", path = %path.to_string_lossy()).entered();
        // SAFETY: the engine keeps the record alive until close, which needs &mut self.
        Ok(unsafe { metadata::compiler_version(self.engine.compiler_version(path)) })
    }

    /// Packages the engine placed in `class`, in engine order.
    pub fn packages(&self, class: PackageClass) -> Result<Vec<Package>> {
        let path = self.live_path()?;
        let _span = span_trace!("gore.packages", path = %path.to_string_lossy(), class = %class)
            .entered();
        // SAFETY: see compiler_version.
        let pkgs = unsafe { packages::packages(self.engine.packages(path, class)) };
        debug!(count = pkgs.len(), "Reconstructed packages");
        Ok(pkgs)
    }

    /// Packages of the main project.
    pub fn project_packages(&self) -> Result<Vec<Package>> {
        self.packages(PackageClass::Project)
    }

    /// Vendored and third-party packages.
    pub fn vendor_packages(&self) -> Result<Vec<Package>> {
        self.packages(PackageClass::Vendor)
    }

    /// Standard library packages.
    pub fn std_packages(&self) -> Result<Vec<Package>> {
        self.packages(PackageClass::Std)
    }

    /// Packages the engine could not classify.
    pub fn unknown_packages(&self) -> Result<Vec<Package>> {
        self.packages(PackageClass::Unknown)
    }

    /// Every type in the binary.
    pub fn types(&self) -> Result<TypeGraph> {
        let path = self.live_path()?;
        let _span = span_trace!("gore.types", path = %path.to_string_lossy()).entered();
        let mut builder = TypeGraphBuilder::new();
        // SAFETY: see compiler_version.
        unsafe { builder.add_entries(self.engine.types(path)) };
        Ok(builder.finish())
    }

    /// Build id embedded in the binary, empty when there is none.
    pub fn build_id(&self) -> Result<String> {
        let path = self.live_path()?;
        // SAFETY: see compiler_version.
        Ok(unsafe { metadata::build_id(self.engine.build_id(path)) })
    }
}

impl std::fmt::Debug for GoFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoFile")
            .field("path", &self.path)
            .field("open", &self.is_open())
            .finish()
    }
}

impl Drop for GoFile {
    fn drop(&mut self) {
        if self.is_open() {
            if let Err(e) = self.close() {
                log_error!(e, "close on drop");
            }
        }
    }
}
