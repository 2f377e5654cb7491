use std::path::PathBuf;

use crate::registry::RegistryError;

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("root type `{0}` is not registered")]
    MissingRoot(String),

    #[error("`{context}`: `{field}` is an enum the registry cannot name")]
    AnonymousEnum { context: String, field: String },

    #[error("`{context}`: `{field}` has a type with no host mapping ({ty})")]
    UnmappedType { context: String, field: String, ty: String },

    #[error("enum `{enum_name}`: value `{value}` gives invalid constant name `{constant}`")]
    InvalidConstant { enum_name: String, value: String, constant: String },

    #[error("operation `{nickname}`: {source}")]
    Operation {
        nickname: String,
        #[source]
        source: RegistryError,
    },

    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
