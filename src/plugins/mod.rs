//! Dynamic plugin hosting: isolation, loading, supervision and routing.

pub mod isolation;
pub mod loading;
pub mod routes;
pub mod runtime;
pub mod supervisor;

pub use isolation::{IsolationHandle, LibraryLoader, LoadedModule, ModuleLoader};
pub use loading::LoadingContext;
pub use routes::RouteTable;
pub use runtime::{PluginRuntime, PluginStatus};
pub use supervisor::{ExecuteOutcome, PluginSupervisor, SupervisorState, MAX_ERRORS};
