// Host-level declaration IR. Everything here is already mapped to PHP type
// names; rendering is plain string assembly.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnType {
    Void,
    Single(String),
    /// Two or more outputs, returned as an array keyed by argument name.
    Aggregate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub host_type: String,
}

/// `@see <enum_name> for possible values for $<param>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumRef {
    pub enum_name: String,
    pub param: String,
}

/// One key of an aggregate return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputDoc {
    pub name: String,
    pub host_type: String,
    pub blurb: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub is_static: bool,
    pub returns: ReturnType,
    pub name: String,
    pub params: Vec<Param>,      // required inputs, receiver excluded
    pub summary: String,         // capitalized description
    pub enum_refs: Vec<EnumRef>, // outputs first, then inputs
    pub outputs: Vec<OutputDoc>, // empty unless `returns` is Aggregate
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDoc {
    pub name: String,
    pub host_type: String,
    pub blurb: String,
    pub enum_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumConstant {
    pub name: String,
    /// Registry value, untouched.
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDoc {
    pub host_name: String,
    pub constants: Vec<EnumConstant>,
}
