//! Implementation of the `render` command.

use super::{raw_vars, read_input};
use crate::cli::RenderArgs;
use langfuse_prompt::config::Config;
use langfuse_prompt::error::Result;
use langfuse_prompt::template::{self, RenderOptions};
use langfuse_prompt::vars::parse_vars;
use std::io::Write;

/// Execute the `render` command.
pub fn cmd_render(args: RenderArgs, config: &Config) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    render_to(args, config, &mut out)
}

fn render_to<W: Write>(args: RenderArgs, config: &Config, out: &mut W) -> Result<()> {
    let template = match args.template {
        Some(text) => text,
        None => read_input(args.file.as_deref(), "template")?,
    };
    let context = parse_vars(raw_vars(&args.vars)?)?;
    let options =
        RenderOptions::keep_original(args.keep_original_on_error || config.keep_original_on_error);

    let rendered = template::render(&template, &context, options);
    out.write_all(rendered.as_bytes())?;
    if !rendered.ends_with('\n') {
        writeln!(out)?;
    }
    out.flush()?;
    Ok(())
}
