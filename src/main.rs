//! recfill - fill text templates from JSON records
//!
//! CLI entry point: reads a template and a record, prints the filled text.

use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use clap::Parser;
use eyre::{Context, Result, bail, eyre};
use tracing::{debug, info};

use recfill::{CompiledTemplate, Value};

mod cli;

use cli::Cli;

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { tracing::Level::DEBUG } else { tracing::Level::WARN };

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .try_init()
        .map_err(|e| eyre!("{e}"))?;

    debug!("Logging initialized (verbose: {})", verbose);
    Ok(())
}

fn load_template(cli: &Cli) -> Result<String> {
    match (&cli.template, &cli.inline) {
        (_, Some(text)) => Ok(text.clone()),
        (Some(path), None) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read template {}", path.display())),
        (None, None) => bail!("No template given"),
    }
}

fn load_record(path: Option<&Path>) -> Result<Value> {
    let text = match path {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read record {}", path.display()))?,
        None => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read record from stdin")?;
            text
        }
    };
    serde_json::from_str(&text).context("Record is not valid JSON")
}

fn select_entry(record: Value, key: Option<&str>) -> Result<Value> {
    let Some(key) = key else {
        return Ok(record);
    };
    match record {
        Value::Map(mut map) => map
            .remove(key)
            .ok_or_else(|| eyre!("Record has no top-level entry {key:?}")),
        other => bail!("--key needs a top-level object, record is a {}", other.type_name()),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose).context("Failed to setup logging")?;

    let source = load_template(&cli)?;
    let record = load_record(cli.record.as_deref())?;
    let record = select_entry(record, cli.key.as_deref())?;

    let template = CompiledTemplate::compile(&source);
    info!(embeds = template.ast().embed_count(), "template compiled");

    let output = template
        .render_with_options(&record, cli.fill_options())
        .map_err(|e| {
            let location = e
                .span
                .and_then(|s| source.get(s.start..s.end))
                .map(|text| format!(" at {text:?}"))
                .unwrap_or_default();
            eyre::Report::new(e).wrap_err(format!("Failed to fill template{location}"))
        })?;

    let mut stdout = io::stdout().lock();
    stdout.write_all(output.as_bytes()).context("Failed to write output")?;
    stdout.flush().context("Failed to flush output")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_select_entry() {
        let index: Value = json!({"101": {"title": "A"}, "102": {"title": "B"}}).into();
        let story = select_entry(index.clone(), Some("102")).unwrap();
        assert_eq!(story.get("title"), Some(&Value::from("B")));
        assert!(select_entry(index.clone(), Some("999")).is_err());
        assert_eq!(select_entry(index.clone(), None).unwrap(), index);
    }

    #[test]
    fn test_select_entry_needs_object() {
        assert!(select_entry(Value::from(vec![1i64]), Some("0")).is_err());
    }
}
