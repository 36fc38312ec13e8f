//! Native SDK library loading
//!
//! Resolves the platform-specific shared-object name and exposes typed
//! symbol lookup over `libloading`. The loaded code runs in-process; the
//! versioning gate in [`crate::version`] is what stands between a stale
//! build and live calls.

use std::path::{Path, PathBuf};

use libloading::{Library, Symbol};
use thiserror::Error;

/// Library loading errors.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("native SDK library not found: {0}")]
    LibraryNotFound(String),

    #[error("symbol '{symbol}' not found in native SDK library")]
    SymbolNotFound { symbol: String },

    #[error("failed to load native SDK library: {0}")]
    LoadFailed(String),
}

/// A loaded native SDK shared library.
pub struct NativeLibrary {
    library: Library,
    path: PathBuf,
}

impl NativeLibrary {
    /// Platform file name for a short library name:
    /// lib{name}.so / lib{name}.dylib / {name}.dll.
    fn platform_file_name(name: &str) -> String {
        if cfg!(target_os = "windows") {
            format!("{name}.dll")
        } else if cfg!(target_os = "macos") {
            format!("lib{name}.dylib")
        } else {
            format!("lib{name}.so")
        }
    }

    fn resolve(name: &str, search_dirs: &[PathBuf]) -> Option<PathBuf> {
        let direct = Path::new(name);
        if direct.is_absolute() && direct.exists() {
            return Some(direct.to_path_buf());
        }
        let file_name = Self::platform_file_name(name);
        for dir in search_dirs {
            let candidate = dir.join(&file_name);
            if candidate.exists() {
                return Some(candidate);
            }
        }
        // Fall back to the current working directory.
        let cwd_candidate = std::env::current_dir().ok()?.join(&file_name);
        cwd_candidate.exists().then_some(cwd_candidate)
    }

    /// Load the library by short name or absolute path.
    ///
    /// # Safety considerations
    ///
    /// Loading executes the library's initialization code. The caller must
    /// trust the resolved file; this type only locates and opens it.
    pub fn open(name: &str, search_dirs: &[PathBuf]) -> Result<Self, LoadError> {
        let path = Self::resolve(name, search_dirs)
            .ok_or_else(|| LoadError::LibraryNotFound(name.to_string()))?;
        let library =
            unsafe { Library::new(&path).map_err(|e| LoadError::LoadFailed(e.to_string()))? };
        tracing::info!(path = %path.display(), "loaded native SDK library");
        Ok(Self { library, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Look up a typed symbol.
    ///
    /// # Safety
    ///
    /// The caller must ensure the symbol's real signature matches `T` and
    /// that the returned symbol does not outlive this library.
    pub unsafe fn get<T>(&self, symbol: &str) -> Result<Symbol<'_, T>, LoadError> {
        self.library
            .get(symbol.as_bytes())
            .map_err(|_| LoadError::SymbolNotFound {
                symbol: symbol.to_string(),
            })
    }
}
