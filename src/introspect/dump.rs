use crate::classify::classify;
use crate::error::GenerateError;
use crate::registry::{Argument, Registry};

/// Plain-text report of one operation's arguments and how they were
/// classified. Debugging aid, never written to a declaration file.
pub fn dump<R>(registry: &R, nickname: &str) -> Result<String, GenerateError>
where
    R: Registry + ?Sized,
{
    let op = registry
        .operation(nickname)
        .map_err(|source| GenerateError::Operation { nickname: nickname.to_string(), source })?;
    let args = classify(&op.arguments);

    let mut out = format!("{nickname}:\n");
    out.push_str(&format!("  description: {}\n", op.description));
    if op.deprecated {
        out.push_str("  deprecated\n");
    }
    for arg in &op.arguments {
        out.push_str(&format!("  {}:\n", arg.name));
        out.push_str(&format!(
            "    flags: {} ({})\n",
            arg.flags.bits(),
            arg.flags.names().join(", ")
        ));
        out.push_str(&format!("    blurb: {}\n", arg.blurb));
        out.push_str(&format!(
            "    type: {}\n",
            arg.ty.name.as_deref().unwrap_or("<anonymous>")
        ));
    }

    out.push_str(&format!("required input: {}\n", join(&args.required_inputs)));
    out.push_str(&format!("required output: {}\n", join(&args.required_outputs)));
    out.push_str(&format!("optional input: {}\n", join(&args.optional_inputs)));
    out.push_str(&format!("optional output: {}\n", join(&args.optional_outputs)));
    out.push_str(&format!(
        "member_this: {}\n",
        args.receiver.map(|arg| arg.name.as_str()).unwrap_or("")
    ));
    out.push_str(&format!("method args: {}\n", join(args.method_args())));
    Ok(out)
}

fn join(args: &[&Argument]) -> String {
    args.iter()
        .map(|arg| arg.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sample_registry;
    use pretty_assertions::assert_eq;

    #[test]
    fn dump_lists_flags_and_categories() {
        let registry = sample_registry();
        let text = dump(&registry, "flip").unwrap();
        assert_eq!(
            text,
            "flip:\n\
             \x20 description: flip an image\n\
             \x20 in:\n\
             \x20   flags: 19 (REQUIRED, CONSTRUCT, INPUT)\n\
             \x20   blurb: Input image\n\
             \x20   type: VipsImage\n\
             \x20 out:\n\
             \x20   flags: 35 (REQUIRED, CONSTRUCT, OUTPUT)\n\
             \x20   blurb: Output image\n\
             \x20   type: VipsImage\n\
             \x20 direction:\n\
             \x20   flags: 19 (REQUIRED, CONSTRUCT, INPUT)\n\
             \x20   blurb: Direction to flip image\n\
             \x20   type: VipsDirection\n\
             \x20 swap:\n\
             \x20   flags: 82 (CONSTRUCT, INPUT, DEPRECATED)\n\
             \x20   blurb: Swap axes\n\
             \x20   type: gboolean\n\
             required input: direction\n\
             required output: out\n\
             optional input: swap\n\
             optional output: \n\
             member_this: in\n\
             method args: direction\n"
        );
    }

    #[test]
    fn static_operations_have_no_member() {
        let registry = sample_registry();
        let text = dump(&registry, "system").unwrap();
        assert!(text.contains("member_this: \n"));
        assert!(text.contains("optional output: out, log\n"));
        assert!(text.contains("method args: cmd-format\n"));
    }
}
