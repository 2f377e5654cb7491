//! Argument roles.
//!
//! Deprecated arguments are dropped first. The first required input image
//! becomes the receiver (the operation is a method on it); without one the
//! operation is a static call. Required inputs flagged MODIFY are outputs,
//! not inputs, so the two required lists never overlap.
use crate::registry::{Argument, ArgumentFlags};

#[derive(Debug, Clone, Default)]
pub struct ClassifiedArgs<'a> {
    pub receiver: Option<&'a Argument>,
    pub required_inputs: Vec<&'a Argument>,
    pub required_outputs: Vec<&'a Argument>,
    pub optional_inputs: Vec<&'a Argument>,
    pub optional_outputs: Vec<&'a Argument>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnShape<'a> {
    Void,
    Single(&'a Argument),
    Aggregate,
}

pub fn classify(args: &[Argument]) -> ClassifiedArgs<'_> {
    let live: Vec<&Argument> = args
        .iter()
        .filter(|arg| !arg.flags.contains(ArgumentFlags::DEPRECATED))
        .collect();

    let receiver = live
        .iter()
        .copied()
        .find(|arg| arg.flags.is_required_input() && arg.ty.is_image());
    let is_receiver = |arg: &Argument| receiver.is_some_and(|r| std::ptr::eq(r, arg));

    let mut out = ClassifiedArgs { receiver, ..ClassifiedArgs::default() };
    for arg in live {
        if is_receiver(arg) {
            continue;
        }
        let flags = arg.flags;
        if flags.is_required_output()
            || (flags.is_required_input() && flags.contains(ArgumentFlags::MODIFY))
        {
            out.required_outputs.push(arg);
        } else if flags.is_required_input() {
            out.required_inputs.push(arg);
        }
    }

    // optional args are not part of any signature; deprecated ones are
    // still accepted at runtime, so they are listed here
    for arg in args.iter().filter(|arg| !arg.flags.contains(ArgumentFlags::REQUIRED)) {
        let flags = arg.flags;
        if flags.contains(ArgumentFlags::OUTPUT) {
            out.optional_outputs.push(arg);
        }
        if flags.contains(ArgumentFlags::INPUT) {
            out.optional_inputs.push(arg);
        }
    }

    out
}

impl<'a> ClassifiedArgs<'a> {
    pub fn return_shape(&self) -> ReturnShape<'a> {
        match self.required_outputs.as_slice() {
            [] => ReturnShape::Void,
            [only] => ReturnShape::Single(only),
            _ => ReturnShape::Aggregate,
        }
    }

    pub fn is_static(&self) -> bool {
        self.receiver.is_none()
    }

    /// Required outputs, then required inputs; the order `@see` lines use.
    pub fn enum_args(&self) -> impl Iterator<Item = &'a Argument> + '_ {
        self.required_outputs
            .iter()
            .chain(self.required_inputs.iter())
            .copied()
            .filter(|arg| arg.ty.is_enum())
    }

    /// Required inputs without the receiver.
    pub fn method_args(&self) -> &[&'a Argument] {
        &self.required_inputs
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————
