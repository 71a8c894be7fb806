//! Implementation of the `fetch` command.

use super::{connect, raw_vars};
use crate::cli::FetchArgs;
use langfuse_prompt::config::Config;
use langfuse_prompt::error::Result;
use langfuse_prompt::langfuse::PromptSource;
use langfuse_prompt::pipeline::{PromptRequest, process_item};
use std::io::Write;

/// Execute the `fetch` command.
pub fn cmd_fetch(args: FetchArgs, config: &Config) -> Result<()> {
    let client = connect(config)?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    fetch_to(args, config, &client, &mut out)
}

fn fetch_to<W: Write>(
    args: FetchArgs,
    config: &Config,
    source: &dyn PromptSource,
    out: &mut W,
) -> Result<()> {
    let request = PromptRequest {
        name: args.name,
        label: args.label.unwrap_or_else(|| config.default_label.clone()),
        vars: raw_vars(&args.vars)?,
        keep_original_on_error: args.keep_original_on_error || config.keep_original_on_error,
    };
    let record = process_item(source, &request)?;

    if args.json {
        serde_json::to_writer_pretty(&mut *out, &record).map_err(std::io::Error::from)?;
        writeln!(out)?;
    } else {
        out.write_all(record.prompt.as_bytes())?;
        if !record.prompt.ends_with('\n') {
            writeln!(out)?;
        }
    }
    out.flush()?;
    Ok(())
}
