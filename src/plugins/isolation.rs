//! The unloadable code boundary.
//!
//! Every loaded plugin binary gets one [`IsolationHandle`] owning the mapped
//! library. The handle is shared by `Arc` between the supervisor and every
//! route entry pointing into the binary, so mapped code is never unmapped
//! while any live reference could still call into it. Dropping the last
//! `Arc` releases the library; actual unmapping is the loader's business and
//! best-effort, the host-visible contract is that the registration is gone.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use libloading::Library;
use tracing::{debug, warn};

use crate::error::{BotError, Result};
use crate::sdk::{BotPlugin, PluginDeclaration, PluginRegistrar, PLUGIN_ENTRY_SYMBOL, TRELLIS_ABI_VERSION};

/// Owns one mapped plugin binary.
pub struct IsolationHandle {
    path: PathBuf,
    /// `None` for detached handles used by in-process (test) loaders.
    _library: Option<Library>,
}

impl IsolationHandle {
    fn new(path: PathBuf, library: Library) -> Self {
        Self {
            path,
            _library: Some(library),
        }
    }

    /// A handle with no backing library, for loaders that construct plugin
    /// instances in-process.
    pub fn detached(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _library: None,
        }
    }

    /// Filesystem path of the loaded artifact (the shadow copy).
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for IsolationHandle {
    fn drop(&mut self) {
        debug!(path = %self.path.display(), "isolation context released");
    }
}

/// Result of loading one plugin binary: the shared isolation handle plus
/// every plugin instance the binary registered.
pub struct LoadedModule {
    pub isolation: Arc<IsolationHandle>,
    pub plugins: Vec<Box<dyn BotPlugin>>,
}

/// Seam between the runtime and the mechanics of getting code mapped.
///
/// The production implementation is [`LibraryLoader`]; tests script plugin
/// sets through an in-process implementation instead.
pub trait ModuleLoader: Send + Sync {
    fn load(&self, path: &Path) -> Result<LoadedModule>;
}

/// Loads plugin binaries with `libloading` and drives their registration
/// entry point.
pub struct LibraryLoader;

impl ModuleLoader for LibraryLoader {
    fn load(&self, path: &Path) -> Result<LoadedModule> {
        // Safety: loading a library runs its initializers; the artifact is
        // trusted host-operator input, not user input.
        let library = unsafe { Library::new(path) }.map_err(|e| {
            BotError::Load(format!("Cannot load '{}': {e}", path.display()))
        })?;

        let declaration = unsafe {
            library
                .get::<*const PluginDeclaration>(PLUGIN_ENTRY_SYMBOL)
                .map_err(|e| {
                    BotError::Load(format!(
                        "'{}' has no plugin entry symbol: {e}",
                        path.display()
                    ))
                })?
                .read()
        };

        if declaration.abi_version != TRELLIS_ABI_VERSION {
            warn!(
                path = %path.display(),
                found = declaration.abi_version,
                expected = TRELLIS_ABI_VERSION,
                "plugin ABI version mismatch"
            );
            return Err(BotError::Load(format!(
                "'{}' was built against ABI v{}, host speaks v{}",
                path.display(),
                declaration.abi_version,
                TRELLIS_ABI_VERSION
            )));
        }

        let mut registrar = PluginRegistrar::new();
        unsafe { (declaration.register)(&mut registrar) };

        Ok(LoadedModule {
            isolation: Arc::new(IsolationHandle::new(path.to_path_buf(), library)),
            plugins: registrar.into_plugins(),
        })
    }
}
