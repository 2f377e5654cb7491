use crate::classify::{ReturnShape, classify};
use crate::config::GeneratorConfig;
use crate::error::GenerateError;
use crate::ir::{EnumRef, OutputDoc, Param, ReturnType, Signature};
use crate::registry::{Argument, Registry, TypeDescriptor};
use crate::typemap::{Position, TypeMapper};

use super::{capitalize, host_name};

pub struct OperationIntrospector<'a, R: Registry + ?Sized> {
    registry: &'a R,
    config: &'a GeneratorConfig,
    mapper: &'a TypeMapper,
}

impl<'a, R: Registry + ?Sized> OperationIntrospector<'a, R> {
    pub fn new(registry: &'a R, config: &'a GeneratorConfig, mapper: &'a TypeMapper) -> Self {
        Self { registry, config, mapper }
    }

    pub fn signature(&self, nickname: &str) -> Result<Signature, GenerateError> {
        let op = self
            .registry
            .operation(nickname)
            .map_err(|source| GenerateError::Operation { nickname: nickname.to_string(), source })?;
        let args = classify(&op.arguments);

        let returns = match args.return_shape() {
            ReturnShape::Void => ReturnType::Void,
            ReturnShape::Single(arg) => ReturnType::Single(self.map(nickname, arg, Position::Result)?),
            ReturnShape::Aggregate => ReturnType::Aggregate,
        };

        let params = args
            .required_inputs
            .iter()
            .map(|arg| {
                Ok(Param {
                    name: host_name(&arg.name),
                    host_type: self.map(nickname, arg, Position::Argument)?,
                })
            })
            .collect::<Result<Vec<_>, GenerateError>>()?;

        let enum_refs = args
            .enum_args()
            .map(|arg| {
                Ok(EnumRef {
                    enum_name: enum_ref_name(self.config, nickname, &arg.name, &arg.ty)?,
                    param: host_name(&arg.name),
                })
            })
            .collect::<Result<Vec<_>, GenerateError>>()?;

        let mut outputs = Vec::new();
        if args.return_shape() == ReturnShape::Aggregate {
            for arg in &args.required_outputs {
                outputs.push(OutputDoc {
                    name: host_name(&arg.name),
                    host_type: self.map(nickname, arg, Position::Argument)?,
                    blurb: capitalize(&arg.blurb),
                });
            }
        }

        Ok(Signature {
            is_static: args.is_static(),
            returns,
            name: nickname.to_string(),
            params,
            summary: capitalize(&op.description),
            enum_refs,
            outputs,
        })
    }

    /// The rendered `@method` block for one operation.
    pub fn introspect(&self, nickname: &str) -> Result<String, GenerateError> {
        Ok(render_signature(&self.signature(nickname)?))
    }

    fn map(&self, nickname: &str, arg: &Argument, position: Position) -> Result<String, GenerateError> {
        self.mapper
            .map_type(&arg.ty, position)
            .map(str::to_string)
            .map_err(|unmapped| GenerateError::UnmappedType {
                context: nickname.to_string(),
                field: arg.name.clone(),
                ty: unmapped.0,
            })
    }
}

/// Prefix-stripped enum name for an `@see` line. An enum without a name
/// cannot be referenced, so this is fatal.
pub(crate) fn enum_ref_name(
    config: &GeneratorConfig,
    context: &str,
    field: &str,
    ty: &TypeDescriptor,
) -> Result<String, GenerateError> {
    let name = ty.name.as_deref().ok_or_else(|| GenerateError::AnonymousEnum {
        context: context.to_string(),
        field: field.to_string(),
    })?;
    Ok(config.strip_prefix(name).to_string())
}

pub fn render_signature(sig: &Signature) -> String {
    let mut out = String::from(" * @method ");
    if sig.is_static {
        out.push_str("static ");
    }
    match &sig.returns {
        ReturnType::Void => out.push_str("void "),
        ReturnType::Single(host_type) => out.push_str(&format!("{host_type} ")),
        ReturnType::Aggregate => out.push_str("array "),
    }
    out.push_str(&format!("{}(", sig.name));
    for param in &sig.params {
        out.push_str(&format!("{} ${}, ", param.host_type, param.name));
    }
    out.push_str("array $options = []) ");
    out.push_str(&format!("{}.\n", sig.summary));

    for see in &sig.enum_refs {
        out.push_str(&format!(
            " *     @see {} for possible values for ${}\n",
            see.enum_name, see.param
        ));
    }

    if !sig.outputs.is_empty() {
        out.push_str(" *     Return array with: [\n");
        for output in &sig.outputs {
            out.push_str(&format!(
                " *         '{}' => @type {} {}\n",
                output.name, output.host_type, output.blurb
            ));
        }
        out.push_str(" *     ];\n");
    }

    out.push_str(" *     @throws Exception\n");
    out
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————
