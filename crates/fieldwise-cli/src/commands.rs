use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use colored::Colorize;
use fieldwise_merge::{
    DynamicRecord, DynamicSchema, FieldOutcome, MergeReport, Merger, SchemaCatalog,
};
use fieldwise_types::MergePolicy;
use serde_json::{json, Value};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Merge(args) => cmd_merge(args, &cli.format),
        Command::Schemas(args) => cmd_schemas(args, &cli.format),
    }
}

fn cmd_merge(args: MergeArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let (merged, report) = merge_files(&args)?;

    let document = match format {
        OutputFormat::Json if args.report => json!({
            "merged": merged.to_json(),
            "report": report_json(&report),
        }),
        _ => merged.to_json(),
    };
    let rendered = serde_json::to_string_pretty(&document)?;

    match &args.output {
        Some(path) => {
            fs::write(path, format!("{rendered}\n"))
                .with_context(|| format!("writing {}", path.display()))?;
            if let Some(notice) = written_notice(format, path) {
                println!("{notice}");
            }
        }
        None => println!("{rendered}"),
    }

    if args.report && matches!(format, OutputFormat::Text) {
        for field in &report.fields {
            let outcome = match field.outcome {
                FieldOutcome::Overwritten => field.outcome.to_string().green(),
                FieldOutcome::Kept => field.outcome.to_string().yellow(),
                FieldOutcome::Skipped => field.outcome.to_string().dimmed(),
            };
            eprintln!("  {:<20} {:<10} {}", field.field, field.policy.to_string(), outcome);
        }
    }
    Ok(())
}

fn cmd_schemas(args: SchemasArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let catalog = load_catalog(&args.schemas)?;

    if let OutputFormat::Json = format {
        println!("{}", serde_json::to_string_pretty(&schemas_json(&catalog))?);
        return Ok(());
    }

    if catalog.is_empty() {
        println!("No schemas declared.");
        return Ok(());
    }
    for schema in catalog.iter() {
        println!("{} ({} fields)", schema.name().bold(), schema.fields().len());
        for field in schema.fields() {
            let policy = match field.policy() {
                MergePolicy::Mandatory => "Mandatory".red(),
                MergePolicy::Required => "Required".green(),
                MergePolicy::Ignored => "Ignored".dimmed(),
            };
            let declared = if field.declared_policy().is_none() { " (default)" } else { "" };
            let sealed = if schema.is_sealed(field.name()) { " sealed" } else { "" };
            println!("  {:<20} {}{}{}", field.name(), policy, declared, sealed.cyan());
        }
    }
    Ok(())
}

/// Confirmation line after writing the merged record; JSON mode stays silent.
fn written_notice(format: &OutputFormat, path: &Path) -> Option<String> {
    match format {
        OutputFormat::Text => Some(format!(
            "{} Merged into {}",
            "✓".green().bold(),
            path.display().to_string().bold()
        )),
        OutputFormat::Json => None,
    }
}

fn load_catalog(path: &Path) -> anyhow::Result<SchemaCatalog> {
    SchemaCatalog::load(path).with_context(|| format!("loading schema file {}", path.display()))
}

fn read_record(schema: &Arc<DynamicSchema>, path: &Path) -> anyhow::Result<DynamicRecord> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let value: Value =
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;
    DynamicRecord::from_json(Arc::clone(schema), value).with_context(|| {
        format!("{} does not match schema '{}'", path.display(), schema.name())
    })
}

fn merge_files(args: &MergeArgs) -> anyhow::Result<(DynamicRecord, MergeReport)> {
    let catalog = load_catalog(&args.schemas)?;
    let schema = catalog
        .get(&args.schema)
        .with_context(|| format!("unknown schema '{}'", args.schema))?;

    let mut merged = read_record(&schema, &args.base)?;
    let incoming = read_record(&schema, &args.incoming)?;
    let report = Merger::new().merge(&mut merged, &incoming)?;
    Ok((merged, report))
}

fn report_json(report: &MergeReport) -> Value {
    Value::Array(
        report
            .fields
            .iter()
            .map(|f| {
                json!({
                    "field": f.field,
                    "policy": f.policy,
                    "outcome": f.outcome.to_string(),
                })
            })
            .collect(),
    )
}

fn schemas_json(catalog: &SchemaCatalog) -> Value {
    Value::Array(
        catalog
            .iter()
            .map(|schema| {
                let fields: Vec<Value> = schema
                    .fields()
                    .iter()
                    .map(|f| {
                        json!({
                            "name": f.name(),
                            "policy": f.policy(),
                            "declared": f.declared_policy().is_some(),
                            "sealed": schema.is_sealed(f.name()),
                        })
                    })
                    .collect();
                json!({ "name": schema.name(), "fields": fields })
            })
            .collect(),
    )
}
