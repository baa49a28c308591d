mod engine;
mod result;
mod runtime;

pub use self::engine::{Engine, ProcessEngine, Script, CASPER_ENGINE_ENV, DEFAULT_ENGINE};
pub use self::result::{RuntimeError, RuntimeResult};
pub use self::runtime::Runtime;
