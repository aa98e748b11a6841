#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;

use std::io;
use std::path::Path;
use std::path::PathBuf;

use anyhow::bail;
use anyhow::Result;
use clap::value_parser;
use clap::Arg;
use clap::ArgAction;
use clap::ArgMatches;
use clap::Command;
use clap_complete::generate;
use clap_complete::Shell;
use strum::VariantNames;

use super::logging;
use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::DocumentId;
use crate::domain::models::ThemeMode;
use crate::infrastructure::clients::BackendClientManager;

/// What main should do once the command line has been handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliOutcome {
    StartChat,
    Exit,
}

fn arg_backend_url() -> Arg {
    return Arg::new(ConfigKey::BackendUrl.to_string())
        .long(ConfigKey::BackendUrl.to_string())
        .env("DOCUCHAT_BACKEND_URL")
        .num_args(1)
        .global(true)
        .help(format!(
            "Base URL of the document backend. [default: {}]",
            Config::default(ConfigKey::BackendUrl)
        ));
}

fn arg_config_file() -> Arg {
    return Arg::new(ConfigKey::ConfigFile.to_string())
        .short('c')
        .long(ConfigKey::ConfigFile.to_string())
        .env("DOCUCHAT_CONFIG_FILE")
        .num_args(1)
        .global(true)
        .help(format!(
            "Path to configuration file [default: {}]",
            Config::default(ConfigKey::ConfigFile)
        ));
}

fn arg_document_id() -> Arg {
    return Arg::new(ConfigKey::DocumentId.to_string())
        .short('d')
        .long(ConfigKey::DocumentId.to_string())
        .env("DOCUCHAT_DOCUMENT_ID")
        .num_args(1)
        .help("Identifier of an uploaded document, as returned by the upload command.");
}

fn arg_log_file() -> Arg {
    return Arg::new(ConfigKey::LogFile.to_string())
        .long(ConfigKey::LogFile.to_string())
        .env("DOCUCHAT_LOG_FILE")
        .num_args(1)
        .global(true)
        .help(format!(
            "File logs are written to. [default: {}]",
            Config::default(ConfigKey::LogFile)
        ));
}

fn arg_log_level() -> Arg {
    return Arg::new(ConfigKey::LogLevel.to_string())
        .long(ConfigKey::LogLevel.to_string())
        .env("DOCUCHAT_LOG_LEVEL")
        .num_args(1)
        .global(true)
        .value_parser(["error", "warn", "info", "debug", "trace"])
        .help(format!(
            "Minimum level written to the log file. [default: {}]",
            Config::default(ConfigKey::LogLevel)
        ));
}

fn arg_recording_window() -> Arg {
    return Arg::new(ConfigKey::RecordingWindow.to_string())
        .long(ConfigKey::RecordingWindow.to_string())
        .env("DOCUCHAT_RECORDING_WINDOW")
        .num_args(1)
        .global(true)
        .help(format!(
            "Milliseconds a voice question records before it is submitted. [default: {}]",
            Config::default(ConfigKey::RecordingWindow)
        ));
}

fn arg_theme() -> Arg {
    return Arg::new(ConfigKey::Theme.to_string())
        .short('t')
        .long(ConfigKey::Theme.to_string())
        .env("DOCUCHAT_THEME")
        .num_args(1)
        .global(true)
        .value_parser(ThemeMode::VARIANTS.to_vec())
        .help(format!(
            "Color theme the session starts with. [default: {}]",
            Config::default(ConfigKey::Theme)
        ));
}

fn arg_timeout() -> Arg {
    return Arg::new(ConfigKey::Timeout.to_string())
        .long(ConfigKey::Timeout.to_string())
        .env("DOCUCHAT_TIMEOUT")
        .num_args(1)
        .global(true)
        .help(format!(
            "Time in milliseconds a backend request may take. [default: {}]",
            Config::default(ConfigKey::Timeout)
        ));
}

fn subcommand_chat() -> Command {
    return Command::new("chat")
        .about("Start a chat session with an uploaded document (default).")
        .arg(arg_document_id());
}

fn subcommand_upload() -> Command {
    return Command::new("upload")
        .about("Upload a PDF or MP4 document to the backend and print its document ID.")
        .arg(
            Arg::new("path")
                .help("Path of the document to upload.")
                .required(true)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("open")
                .long("open")
                .help("Start a chat session with the document once it is uploaded.")
                .action(ArgAction::SetTrue),
        );
}

fn subcommand_config() -> Command {
    return Command::new("config")
        .about("Configuration file options.")
        .subcommand_required(true)
        .subcommand(
            Command::new("default").about("Print the default config.toml to stdout."),
        );
}

fn subcommand_completions() -> Command {
    return Command::new("completions")
        .about("Generates shell completions.")
        .arg(
            Arg::new("shell")
                .short('s')
                .long("shell")
                .help("Which shell to generate completions for.")
                .value_parser(value_parser!(Shell))
                .required(true),
        );
}

pub fn build() -> Command {
    let about = format!(
        "{}\n\nAsk questions about an uploaded document, request summaries and browse the insights the backend extracted from it.",
        env!("CARGO_PKG_DESCRIPTION")
    );

    return Command::new("docuchat")
        .about(about)
        .version(env!("CARGO_PKG_VERSION"))
        .arg_required_else_help(false)
        .subcommand(subcommand_chat())
        .subcommand(subcommand_upload())
        .subcommand(subcommand_config())
        .subcommand(subcommand_completions())
        .arg(arg_backend_url())
        .arg(arg_config_file())
        .arg(arg_document_id())
        .arg(arg_log_file())
        .arg(arg_log_level())
        .arg(arg_recording_window())
        .arg(arg_theme())
        .arg(arg_timeout());
}

async fn upload(path: &Path, open: bool) -> Result<CliOutcome> {
    let client = BackendClientManager::get()?;
    let receipt = client.upload(path).await?;

    println!("{}", receipt.document_id);
    if let Some(key) = &receipt.compressed_s3_key {
        tracing::info!(document_id = %receipt.document_id, compressed_s3_key = %key, "document uploaded");
    }

    if !open {
        return Ok(CliOutcome::Exit);
    }

    let document_id = DocumentId::parse(&receipt.document_id)?;
    Config::set(ConfigKey::DocumentId, document_id.as_str());

    return Ok(CliOutcome::StartChat);
}

pub async fn parse() -> Result<CliOutcome> {
    let matches = build().get_matches();
    return handle(matches).await;
}

pub async fn handle(matches: ArgMatches) -> Result<CliOutcome> {
    match matches.subcommand() {
        Some(("completions", subcmd_matches)) => {
            if let Some(shell) = subcmd_matches.get_one::<Shell>("shell").copied() {
                let mut app = build();
                let name = app.get_name().to_string();
                generate(shell, &mut app, name, &mut io::stdout());
            }
            return Ok(CliOutcome::Exit);
        }
        Some(("config", subcmd_matches)) => {
            if let Some(("default", _)) = subcmd_matches.subcommand() {
                println!("{}", Config::serialize_default(build()));
            }
            return Ok(CliOutcome::Exit);
        }
        Some(("upload", subcmd_matches)) => {
            Config::load(build(), vec![&matches, subcmd_matches]).await?;
            logging::init()?;
            let path = match subcmd_matches.get_one::<PathBuf>("path") {
                Some(path) => path,
                None => bail!("a path to upload is required"),
            };
            let open = subcmd_matches.get_flag("open");
            return upload(path, open).await;
        }
        Some(("chat", subcmd_matches)) => {
            Config::load(build(), vec![&matches, subcmd_matches]).await?;
        }
        _ => {
            Config::load(build(), vec![&matches]).await?;
        }
    }
    logging::init()?;

    if Config::get(ConfigKey::DocumentId).is_empty() {
        bail!("a document ID is required, pass --document-id or run `docuchat upload <path> --open`");
    }

    return Ok(CliOutcome::StartChat);
}
