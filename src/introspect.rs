//! Registry metadata → declaration IR.
//!
//! - `operation`: one `@method` block per operation nickname.
//! - `enums`: ordered `(CONSTANT, 'value')` pairs for one enum type.
//! - `dump`: plain-text report of how an operation's arguments were read.
pub mod dump;
pub mod enums;
pub mod operation;

pub use dump::dump;
pub use enums::{constant_name, enum_doc};
pub use operation::{OperationIntrospector, render_signature};

/// PHP variables cannot contain `-`.
pub fn host_name(name: &str) -> String {
    name.replace('-', "_")
}

/// Upper-case the first character, leave the rest alone.
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
