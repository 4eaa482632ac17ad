//! Shared-library entry point convention.
//!
//! Each plugin binary exports one well-known static, [`PLUGIN_ENTRY_SYMBOL`],
//! pointing at a [`PluginDeclaration`]. The host checks the declaration's ABI
//! version before calling its `register` function, which hands every bundled
//! [`BotPlugin`] implementation to the host through a [`PluginRegistrar`].
//!
//! Dynamic loading relies on the plugin being compiled against the same
//! `trellis` SDK version and Rust toolchain as the host; the ABI version
//! check catches declaration-shape mismatches before any Rust types cross
//! the boundary.

use super::plugin::BotPlugin;

/// Bumped whenever the declaration or contract shapes change incompatibly.
pub const TRELLIS_ABI_VERSION: u32 = 1;

/// Name of the exported declaration static, NUL-terminated for symbol lookup.
pub const PLUGIN_ENTRY_SYMBOL: &[u8] = b"TRELLIS_PLUGIN\0";

/// Collects the plugin instances a binary bundles.
#[derive(Default)]
pub struct PluginRegistrar {
    plugins: Vec<Box<dyn BotPlugin>>,
}

impl PluginRegistrar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called by the plugin's registration function, once per bundled
    /// plugin type.
    pub fn register(&mut self, plugin: Box<dyn BotPlugin>) {
        self.plugins.push(plugin);
    }

    pub(crate) fn into_plugins(self) -> Vec<Box<dyn BotPlugin>> {
        self.plugins
    }
}

/// The entry declaration a plugin binary exports.
#[repr(C)]
pub struct PluginDeclaration {
    pub abi_version: u32,
    pub register: unsafe extern "C" fn(&mut PluginRegistrar),
}

/// Export a registration function as this binary's plugin entry point.
#[macro_export]
macro_rules! export_plugin {
    ($register:expr) => {
        #[no_mangle]
        pub static TRELLIS_PLUGIN: $crate::sdk::PluginDeclaration =
            $crate::sdk::PluginDeclaration {
                abi_version: $crate::sdk::TRELLIS_ABI_VERSION,
                register: {
                    unsafe extern "C" fn trellis_register(
                        registrar: &mut $crate::sdk::PluginRegistrar,
                    ) {
                        ($register)(registrar);
                    }
                    trellis_register
                },
            };
    };
}
