//! Implementation of the `config` command.

use langfuse_prompt::config::Config;
use langfuse_prompt::error::Result;
use std::io::Write;

/// Execute the `config` command: print the effective config as YAML with
/// the secret key redacted.
pub fn cmd_config(config: &Config) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    out.write_all(config.redacted().to_yaml()?.as_bytes())?;
    out.flush()?;
    Ok(())
}
