use std::io::Write;

use meshname_client::{Interpreter, NameClient, ResolveReport, Resolver};
use meshname_core::{Path, Strategy};

use super::Exit;

#[derive(Debug, Clone)]
pub struct ResolveArgs {
    pub root: Path,
    pub name: Path,
    pub strategy: Strategy,
    pub fail_neg: bool,
    pub fail_empty: bool,
    pub json: bool,
}

/// Resolve `args.name` and print its endpoints.
///
/// A negative binding is only fatal with `fail_neg`, an empty endpoint
/// set only with `fail_empty`. Any other resolve error fails the
/// command after the partial endpoints have been printed.
pub async fn resolve<T, W>(
    client: &NameClient<T>,
    args: &ResolveArgs,
    out: &mut W,
) -> anyhow::Result<Exit>
where
    T: Interpreter + Resolver + Clone,
    W: Write,
{
    let report = client.resolve(&args.root, &args.name, args.strategy).await;

    if let Some(err) = &report.error {
        if err.is_negative_binding() && args.fail_neg {
            return Ok(Exit::NegativeBinding(err.to_string()));
        }
    }

    if args.json {
        print_json(args, &report, out)?;
    } else {
        for endpoint in &report.endpoints {
            writeln!(out, "{endpoint}")?;
        }
    }
    out.flush()?;

    match report.error {
        Some(err) if !err.is_negative_binding() => Err(err.into()),
        _ if report.endpoints.is_empty() && args.fail_empty => Ok(Exit::EmptyReplicas(format!(
            "no endpoints for {} in {}",
            args.name, args.root
        ))),
        _ => Ok(Exit::Success),
    }
}

fn print_json<W: Write>(
    args: &ResolveArgs,
    report: &ResolveReport,
    out: &mut W,
) -> anyhow::Result<()> {
    let doc = serde_json::json!({
        "root": args.root,
        "name": args.name,
        "strategy": args.strategy,
        "endpoints": report.endpoints,
        "error": report.error.as_ref().map(ToString::to_string),
    });
    writeln!(out, "{}", serde_json::to_string_pretty(&doc)?)?;
    Ok(())
}
