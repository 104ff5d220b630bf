//! Example CLI reading and editing a layered configuration file.
//!
//! ```text
//! CONFIG="server.port=9090" config_ctl --file app.json get server
//! config_ctl --file app.json set server.tags '["edge"]'
//! RUST_LOG=layered_config=debug config_ctl --file app.json remove server.tags
//! ```

use std::io::{self, Write};

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use layered_config::{Config, ProviderOptions};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "config-ctl", version, about = "Inspects and edits layered configuration")]
struct Cli {
    /// Writable configuration file; the parser follows its extension.
    #[arg(long, default_value = "config.json")]
    file: Utf8PathBuf,
    /// Environment variable holding `key=value` overrides.
    #[arg(long, default_value = "CONFIG")]
    env_var: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the value at a path.
    Get { path: String },
    /// Write a value (JSON, or a plain string) and persist it.
    Set { path: String, value: String },
    /// Delete a path and persist the removal.
    Remove { path: String },
    /// Print the whole merged tree.
    Dump,
}

/// Values that are not valid JSON are taken as plain strings.
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_owned()))
}

fn write_json(value: Option<&Value>) -> anyhow::Result<()> {
    let mut stdout = io::stdout().lock();
    match value {
        Some(found) => serde_json::to_writer_pretty(&mut stdout, found)?,
        None => stdout.write_all(b"null")?,
    }
    stdout.write_all(b"\n")?;
    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::new();
    config
        .use_provider("file", ProviderOptions::new().path(cli.file).mutable(true))?
        .use_provider("env", ProviderOptions::new().variable(cli.env_var))?;
    config.reload().await?;

    match cli.command {
        Command::Get { path } => write_json(config.get(path.as_str()))?,
        Command::Dump => write_json(config.get(""))?,
        Command::Set { path, value } => {
            config.set(path.as_str(), parse_value(&value));
            config.persist().await?;
        }
        Command::Remove { path } => {
            config.remove(path.as_str());
            config.persist().await?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();
    run(Cli::parse()).await
}

#[cfg(test)]
#[expect(
    clippy::expect_used,
    reason = "tests panic to surface configuration mistakes"
)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("42", json!(42))]
    #[case("[\"edge\"]", json!(["edge"]))]
    #[case("plain text", json!("plain text"))]
    #[case("", json!(""))]
    fn values_parse_as_json_or_text(#[case] raw: &str, #[case] expected: Value) {
        assert_eq!(parse_value(raw), expected);
    }

    #[test]
    fn set_command_parses() {
        let cli = Cli::try_parse_from(["config-ctl", "--file", "app.yaml", "set", "a.b", "1"])
            .expect("valid arguments");
        assert_eq!(cli.file.as_str(), "app.yaml");
        assert!(matches!(cli.command, Command::Set { ref path, ref value } if path == "a.b" && value == "1"));
    }
}
