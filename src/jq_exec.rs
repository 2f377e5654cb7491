//! jq pre-filter for snapshot documents, so dumps in a foreign shape can be
//! reshaped into the snapshot layout without a separate tool.
use anyhow::{anyhow, Result};
use jaq_core::{load, Compiler, Ctx, RcIter};
use jaq_json::Val;
use serde_json::Value;

/// Every output of `filter_src` applied to `input`, as JSON.
pub fn run_jaq(filter_src: &str, input: &Value) -> Result<Vec<Value>> {
    let loader = load::Loader::new(jaq_std::defs().chain(jaq_json::defs()));
    let arena = load::Arena::default();
    let program = load::File { code: filter_src, path: () };

    let modules = loader
        .load(&arena, program)
        .map_err(|errs| filter_error("parse", errs))?;

    let filter = Compiler::default()
        .with_funs(jaq_std::funs().chain(jaq_json::funs()))
        .compile(modules)
        .map_err(|errs| filter_error("compile", errs))?;

    let inputs = RcIter::new(core::iter::empty());
    let outputs = filter.run((Ctx::new([], &inputs), Val::from(input.clone())));

    let mut out = Vec::new();
    for item in outputs {
        let val = item.map_err(|e| anyhow!("jq: {e:?}"))?;
        // Val: Display -> JSON text
        out.push(serde_json::from_str::<Value>(&val.to_string())?);
    }
    Ok(out)
}

/// One message for every file the loader or compiler rejected.
fn filter_error<E: std::fmt::Debug>(stage: &str, errs: Vec<(load::File<&str, ()>, E)>) -> anyhow::Error {
    let details: Vec<String> = errs
        .into_iter()
        .map(|(file, err)| format!("{err:?} in `{}`", file.code))
        .collect();
    anyhow!("jq filter rejected at {stage}: {}", details.join("; "))
}
