//! CLI argument parsing for langfuse-prompt.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{ArgAction, Args, Parser, Subcommand};
use serde_json::Value;
use std::path::PathBuf;

/// Fetch Langfuse prompts and render their `{{expression}}` placeholders.
///
/// Connection settings come from `.langfuse-prompt.yaml` (or `--config`) and
/// the LANGFUSE_BASE_URL, LANGFUSE_PUBLIC_KEY and LANGFUSE_SECRET_KEY
/// environment variables.
#[derive(Parser, Debug)]
#[command(name = "langfuse-prompt")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to a config file (must exist).
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for langfuse-prompt.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render a local template.
    ///
    /// Reads the template from --template, --file, or stdin and prints the
    /// rendered text. No network access.
    Render(RenderArgs),

    /// Fetch one prompt from Langfuse and render it.
    Fetch(FetchArgs),

    /// Fetch and render a batch of prompts.
    ///
    /// Reads items as a JSON array or JSON Lines and writes one JSON record
    /// per item to stdout.
    Run(RunArgs),

    /// Print the effective configuration with the secret key redacted.
    Config,
}

/// Where vars come from. At most one source may be given.
#[derive(Args, Debug, Default)]
pub struct VarsArgs {
    /// Vars as JSON text (an object, or an object with an `assignments` list).
    #[arg(long, value_name = "JSON", conflicts_with_all = ["vars_file", "set"])]
    pub vars: Option<String>,

    /// Read vars JSON from a file.
    #[arg(long, value_name = "PATH", conflicts_with = "set")]
    pub vars_file: Option<PathBuf>,

    /// Bind one variable (repeatable). The value is parsed as JSON when it
    /// parses, otherwise used as a string.
    #[arg(long = "set", value_name = "NAME=VALUE", value_parser = parse_assignment)]
    pub set: Vec<(String, Value)>,
}

/// Arguments for the `render` command.
#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Template text.
    #[arg(long, short = 't', conflicts_with = "file")]
    pub template: Option<String>,

    /// Read the template from a file.
    #[arg(long, short = 'f', value_name = "PATH")]
    pub file: Option<PathBuf>,

    #[command(flatten)]
    pub vars: VarsArgs,

    /// Keep failed placeholders verbatim instead of removing them.
    #[arg(long)]
    pub keep_original_on_error: bool,
}

/// Arguments for the `fetch` command.
#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Prompt name (folder-style names like `team/greeting` are allowed).
    pub name: String,

    /// Prompt label (default: config `default_label`).
    #[arg(long, short = 'l')]
    pub label: Option<String>,

    #[command(flatten)]
    pub vars: VarsArgs,

    /// Keep failed placeholders verbatim instead of removing them.
    #[arg(long)]
    pub keep_original_on_error: bool,

    /// Print the full output record as JSON instead of the rendered text.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `run` command.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Read items from a file instead of stdin.
    #[arg(long, short = 'i', value_name = "PATH")]
    pub input: Option<PathBuf>,

    /// Prompt name for items without `promptName`.
    #[arg(long)]
    pub name: Option<String>,

    /// Prompt label for items without `promptLabel` (default: config `default_label`).
    #[arg(long, short = 'l')]
    pub label: Option<String>,

    /// Keep failed placeholders verbatim for items without `keepOriginalOnError`.
    #[arg(long)]
    pub keep_original_on_error: bool,

    /// Record failed items as `{"index", "error"}` and keep going.
    #[arg(long)]
    pub continue_on_fail: bool,
}

/// Parse `NAME=VALUE` for `--set`.
fn parse_assignment(raw: &str) -> Result<(String, Value), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{}'", raw))?;
    if name.is_empty() {
        return Err(format!("missing variable name in '{}'", raw));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((name.to_string(), value))
}

impl Cli {
    /// Parse command line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use serde_json::json;

    #[test]
    fn cli_debug_assert() {
        // Verifies the CLI arguments configuration is valid
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_render_template() {
        let cli = Cli::try_parse_from([
            "langfuse-prompt",
            "render",
            "--template",
            "Hi {{name}}",
            "--vars",
            r#"{"name": "Ada"}"#,
        ])
        .unwrap();
        if let Command::Render(args) = cli.command {
            assert_eq!(args.template.as_deref(), Some("Hi {{name}}"));
            assert_eq!(args.vars.vars.as_deref(), Some(r#"{"name": "Ada"}"#));
            assert!(!args.keep_original_on_error);
        } else {
            panic!("Expected Render command");
        }
    }

    #[test]
    fn parse_render_template_and_file_conflict() {
        let result = Cli::try_parse_from([
            "langfuse-prompt",
            "render",
            "--template",
            "x",
            "--file",
            "t.txt",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn parse_set_assignments() {
        let cli = Cli::try_parse_from([
            "langfuse-prompt",
            "render",
            "--set",
            "name=Ada",
            "--set",
            "count=3",
            "--set",
            "tags=[\"a\"]",
            "--set",
            "eq=a=b",
        ])
        .unwrap();
        if let Command::Render(args) = cli.command {
            assert_eq!(
                args.vars.set,
                vec![
                    ("name".to_string(), json!("Ada")),
                    ("count".to_string(), json!(3)),
                    ("tags".to_string(), json!(["a"])),
                    ("eq".to_string(), json!("a=b")),
                ]
            );
        } else {
            panic!("Expected Render command");
        }
    }

    #[test]
    fn parse_set_rejects_missing_equals() {
        assert!(Cli::try_parse_from(["langfuse-prompt", "render", "--set", "name"]).is_err());
        assert!(Cli::try_parse_from(["langfuse-prompt", "render", "--set", "=x"]).is_err());
    }

    #[test]
    fn parse_vars_sources_conflict() {
        let result = Cli::try_parse_from([
            "langfuse-prompt",
            "render",
            "--vars",
            "{}",
            "--set",
            "a=1",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn parse_fetch() {
        let cli = Cli::try_parse_from([
            "langfuse-prompt",
            "fetch",
            "team/greeting",
            "--label",
            "staging",
            "--json",
            "--keep-original-on-error",
        ])
        .unwrap();
        if let Command::Fetch(args) = cli.command {
            assert_eq!(args.name, "team/greeting");
            assert_eq!(args.label.as_deref(), Some("staging"));
            assert!(args.json);
            assert!(args.keep_original_on_error);
        } else {
            panic!("Expected Fetch command");
        }
    }

    #[test]
    fn parse_fetch_requires_name() {
        assert!(Cli::try_parse_from(["langfuse-prompt", "fetch"]).is_err());
    }

    #[test]
    fn parse_run_defaults() {
        let cli = Cli::try_parse_from(["langfuse-prompt", "run"]).unwrap();
        if let Command::Run(args) = cli.command {
            assert!(args.input.is_none());
            assert!(args.name.is_none());
            assert!(args.label.is_none());
            assert!(!args.continue_on_fail);
        } else {
            panic!("Expected Run command");
        }
    }

    #[test]
    fn parse_run_full() {
        let cli = Cli::try_parse_from([
            "langfuse-prompt",
            "run",
            "--input",
            "items.jsonl",
            "--name",
            "greeting",
            "--label",
            "latest",
            "--continue-on-fail",
        ])
        .unwrap();
        if let Command::Run(args) = cli.command {
            assert_eq!(args.input, Some(PathBuf::from("items.jsonl")));
            assert_eq!(args.name.as_deref(), Some("greeting"));
            assert_eq!(args.label.as_deref(), Some("latest"));
            assert!(args.continue_on_fail);
        } else {
            panic!("Expected Run command");
        }
    }

    #[test]
    fn parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "langfuse-prompt",
            "config",
            "--config",
            "custom.yaml",
            "-vv",
        ])
        .unwrap();
        assert!(matches!(cli.command, Command::Config));
        assert_eq!(cli.config, Some(PathBuf::from("custom.yaml")));
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn parse_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["langfuse-prompt", "config", "-q", "-v"]).is_err());
    }
}
