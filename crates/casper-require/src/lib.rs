#![allow(clippy::cargo_common_metadata)]

mod error;
mod exports;
mod loader;
mod registry;
mod resolver;

pub use self::error::{RequireError, RequireResult};
pub use self::exports::Exports;
pub use self::loader::{PrimitiveLoader, Require};
pub use self::registry::{ExtensionHandler, ExtensionRegistry, ModuleCache, StubRegistry};
pub use self::resolver::{ModuleResolver, PatchedRequire, ScriptBaseDir};
