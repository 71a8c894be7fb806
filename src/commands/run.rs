//! Implementation of the `run` command.

use super::{connect, read_input};
use crate::cli::RunArgs;
use langfuse_prompt::config::Config;
use langfuse_prompt::error::Result;
use langfuse_prompt::langfuse::PromptSource;
use langfuse_prompt::pipeline::{BatchOptions, ItemDefaults, parse_batch_input, run_batch};
use std::io::Write;

/// Execute the `run` command.
///
/// Credentials are checked once, before any item is read or processed.
pub fn cmd_run(args: RunArgs, config: &Config) -> Result<()> {
    let client = connect(config)?;
    let input = read_input(args.input.as_deref(), "batch input")?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run_to(args, config, &input, &client, &mut out)
}

fn run_to<W: Write>(
    args: RunArgs,
    config: &Config,
    input: &str,
    source: &dyn PromptSource,
    out: &mut W,
) -> Result<()> {
    let items = parse_batch_input(input)?;
    log::info!("processing {} item(s)", items.len());

    let defaults = ItemDefaults {
        name: args.name,
        label: args.label.unwrap_or_else(|| config.default_label.clone()),
        keep_original_on_error: args.keep_original_on_error || config.keep_original_on_error,
    };
    let options = BatchOptions {
        continue_on_fail: args.continue_on_fail,
    };

    let summary = run_batch(source, items, &defaults, options, out)?;
    if summary.failed > 0 {
        log::warn!("{} item(s) failed", summary.failed);
    }
    Ok(())
}
