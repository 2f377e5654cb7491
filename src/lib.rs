pub mod classify;
pub mod config;
pub mod emit;
pub mod error;
pub mod introspect;
pub mod ir;
pub mod jq_exec;
pub mod path_de;
pub mod registry;
pub mod typemap;
pub mod walk;

#[cfg(test)]
pub(crate) mod testing;

pub use config::GeneratorConfig;
pub use emit::{EmittedFile, Emitter};
pub use error::GenerateError;
pub use registry::{Registry, SnapshotRegistry};
