//! Command implementations for langfuse-prompt.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations, plus the input helpers they share.

mod config_cmd;
mod fetch;
mod render;
mod run;

use crate::cli::{Cli, Command, VarsArgs};
use langfuse_prompt::config::{Config, ConfigSource};
use langfuse_prompt::error::{PromptError, Result};
use langfuse_prompt::langfuse::LangfuseClient;
use serde_json::{Value, json};
use std::io::Read;
use std::path::Path;

/// Dispatch a command to its implementation.
///
/// `fetch`, `run` and `config` fail on a config that does not load. `render`
/// works offline, so it only fails when `--config` names a bad file.
pub fn dispatch(cli: Cli) -> Result<()> {
    let resolved = Config::resolve(cli.config.as_deref());

    match cli.command {
        Command::Render(args) => {
            let config = offline_config(resolved, cli.config.is_some())?;
            render::cmd_render(args, &config)
        }
        Command::Fetch(args) => fetch::cmd_fetch(args, &loaded(resolved)?),
        Command::Run(args) => run::cmd_run(args, &loaded(resolved)?),
        Command::Config => config_cmd::cmd_config(&loaded(resolved)?),
    }
}

fn loaded(resolved: Result<(Config, ConfigSource)>) -> Result<Config> {
    let (config, source) = resolved?;
    log::info!("using config from {}", source);
    Ok(config)
}

/// Fall back to defaults when an implicitly found config does not load.
fn offline_config(resolved: Result<(Config, ConfigSource)>, explicit: bool) -> Result<Config> {
    match resolved {
        Err(err) if !explicit => {
            log::warn!("ignoring config: {}", err);
            Ok(Config::default())
        }
        resolved => loaded(resolved),
    }
}

/// Read a file, or stdin when no path is given.
fn read_input(path: Option<&Path>, what: &str) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path).map_err(|e| {
            PromptError::UserError(format!(
                "failed to read {} from '{}': {}",
                what,
                path.display(),
                e
            ))
        }),
        None => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text).map_err(|e| {
                PromptError::UserError(format!("failed to read {} from stdin: {}", what, e))
            })?;
            Ok(text)
        }
    }
}

/// Raw vars from the command line, in the shape the vars normalizer accepts.
///
/// `--vars` and `--vars-file` pass JSON text through untouched so that a
/// parse failure surfaces as a vars error; `--set` builds an assignment list.
fn raw_vars(args: &VarsArgs) -> Result<Option<Value>> {
    if let Some(text) = &args.vars {
        return Ok(Some(Value::String(text.clone())));
    }
    if let Some(path) = &args.vars_file {
        return read_input(Some(path), "vars").map(|text| Some(Value::String(text)));
    }
    if args.set.is_empty() {
        return Ok(None);
    }
    let assignments: Vec<Value> = args
        .set
        .iter()
        .map(|(name, value)| json!({"name": name, "value": value}))
        .collect();
    Ok(Some(json!({ "assignments": assignments })))
}

/// Validate credentials and build the Langfuse client.
fn connect(config: &Config) -> Result<LangfuseClient> {
    let credentials = config.credentials();
    credentials.validate()?;
    Ok(LangfuseClient::new(&credentials, config.timeout())?)
}
