//! The native type registry, seen from the generator's side.
//!
//! Everything the generator knows about libvips comes through the
//! [`Registry`] trait: type lookup, operation metadata, enum values and the
//! default property set of an image. A live FFI binding and the offline
//! [`SnapshotRegistry`] are interchangeable behind it.
pub mod snapshot;

use bitflags::bitflags;

pub use snapshot::{Snapshot, SnapshotError, SnapshotRegistry};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// Opaque handle into the registry's type table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeId(pub(crate) usize);

/// The coarse category a registered type reduces to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Fundamental {
    Bool,
    Int,
    Double,
    String,
    RefString,
    Enum,
    Flags,
    Object,
    Image,
    ArrayInt,
    ArrayDouble,
    ArrayImage,
    Blob,
    Unknown,
}

/// Kind tag plus the type's own name, when the registry can name it.
///
/// An enum argument is `{ fundamental: Enum, name: Some("VipsDirection") }`;
/// the fundamental kind is always known, the specific name may not be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
    pub fundamental: Fundamental,
    pub name: Option<String>,
}

bitflags! {
    /// `VipsArgumentFlags`, bit for bit.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct ArgumentFlags: u32 {
        const REQUIRED = 1 << 0;
        const CONSTRUCT = 1 << 1;
        const SET_ONCE = 1 << 2;
        const SET_ALWAYS = 1 << 3;
        const INPUT = 1 << 4;
        const OUTPUT = 1 << 5;
        const DEPRECATED = 1 << 6;
        const MODIFY = 1 << 7;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argument {
    pub name: String,
    pub flags: ArgumentFlags,
    pub ty: TypeDescriptor,
    pub blurb: String,
}

#[derive(Debug, Clone)]
pub struct OperationDescriptor {
    pub nickname: String,
    pub description: String,
    pub deprecated: bool,
    /// Declared order.
    pub arguments: Vec<Argument>,
}

#[derive(Debug, Clone)]
pub struct PropertyDescriptor {
    pub name: String,
    pub ty: TypeDescriptor,
    pub blurb: String,
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("unknown type `{0}`")]
    UnknownType(String),
    #[error("unknown operation `{0}`")]
    UnknownOperation(String),
    #[error("`{0}` is abstract and cannot be instantiated")]
    Abstract(String),
    #[error("`{0}` is not an enum type")]
    NotAnEnum(String),
}

/// Read-only capabilities the generator needs from the native registry.
///
/// `force_registration` is the one exception to read-only: some libvips
/// enums only exist once their `*_get_type()` has been called.
pub trait Registry {
    fn type_from_name(&self, name: &str) -> Option<TypeId>;
    fn describe(&self, ty: TypeId) -> TypeDescriptor;
    fn is_abstract(&self, ty: TypeId) -> bool;
    /// Direct descendants only.
    fn children(&self, ty: TypeId) -> Vec<TypeId>;
    fn nickname(&self, ty: TypeId) -> Option<String>;
    fn operation(&self, nickname: &str) -> Result<OperationDescriptor, RegistryError>;
    fn enum_values(&self, ty: TypeId) -> Result<Vec<String>, RegistryError>;
    /// Properties of a throwaway image instance.
    fn image_properties(&self) -> Result<Vec<PropertyDescriptor>, RegistryError>;
    fn force_registration(&self, type_name: &str) -> Result<(), RegistryError>;
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl Fundamental {
    /// Every kind except `Unknown` is rooted at one well-known registry type.
    pub const ROOTS: [(&'static str, Fundamental); 13] = [
        ("gboolean", Fundamental::Bool),
        ("gint", Fundamental::Int),
        ("gdouble", Fundamental::Double),
        ("gchararray", Fundamental::String),
        ("VipsRefString", Fundamental::RefString),
        ("GEnum", Fundamental::Enum),
        ("GFlags", Fundamental::Flags),
        ("GObject", Fundamental::Object),
        ("VipsImage", Fundamental::Image),
        ("VipsArrayInt", Fundamental::ArrayInt),
        ("VipsArrayDouble", Fundamental::ArrayDouble),
        ("VipsArrayImage", Fundamental::ArrayImage),
        ("VipsBlob", Fundamental::Blob),
    ];

    pub fn from_root_name(name: &str) -> Option<Self> {
        Self::ROOTS
            .iter()
            .find(|(root, _)| *root == name)
            .map(|(_, kind)| *kind)
    }

    pub fn root_name(self) -> Option<&'static str> {
        Self::ROOTS
            .iter()
            .find(|(_, kind)| *kind == self)
            .map(|(root, _)| *root)
    }
}

impl TypeDescriptor {
    pub fn is_enum(&self) -> bool {
        self.fundamental == Fundamental::Enum
    }
    pub fn is_image(&self) -> bool {
        self.fundamental == Fundamental::Image
    }
}

impl ArgumentFlags {
    pub fn is_required_input(self) -> bool {
        self.contains(Self::REQUIRED | Self::INPUT)
    }
    pub fn is_required_output(self) -> bool {
        self.contains(Self::REQUIRED | Self::OUTPUT)
    }
    /// Flag names in bit order, for the introspection dump.
    pub fn names(self) -> Vec<&'static str> {
        self.iter_names().map(|(name, _)| name).collect()
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roots_resolve_both_ways() {
        for (name, kind) in Fundamental::ROOTS {
            assert_eq!(Fundamental::from_root_name(name), Some(kind));
            assert_eq!(kind.root_name(), Some(name));
        }
        assert_eq!(Fundamental::Unknown.root_name(), None);
        assert_eq!(Fundamental::from_root_name("VipsInterpolate"), None);
    }

    #[test]
    fn flags_follow_libvips_bit_values() {
        // REQUIRED | CONSTRUCT | INPUT, the usual required input
        let flags = ArgumentFlags::from_bits_truncate(19);
        assert!(flags.is_required_input());
        assert!(!flags.is_required_output());
        assert_eq!(flags.names(), vec!["REQUIRED", "CONSTRUCT", "INPUT"]);

        let modify = ArgumentFlags::from_bits_truncate(1 | 2 | 16 | 128);
        assert!(modify.contains(ArgumentFlags::MODIFY));

        // unknown high bits are dropped
        assert_eq!(ArgumentFlags::from_bits_truncate(1 << 12), ArgumentFlags::empty());
    }
}
