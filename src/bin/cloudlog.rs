use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use cloud_log_handler::config::loader::load_config;
use cloud_log_handler::handler::dispatch::TokioScheduler;
use cloud_log_handler::observability::logging::init_logging;
use cloud_log_handler::sink::WriterSink;
use cloud_log_handler::{Attr, CloudLoggingHandler, HandlerConfig, Level, Options, Record};

#[derive(Parser)]
#[command(name = "cloudlog")]
#[command(about = "Send structured log records to a cloud logging backend", long_about = None)]
struct Cli {
    /// Handler configuration file (TOML)
    #[arg(short, long, default_value = "cloudlog.toml")]
    config: PathBuf,

    /// Diagnostic log filter, overridden by RUST_LOG
    #[arg(long, default_value = "warn")]
    log_filter: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send one record
    Send {
        #[arg(short, long, default_value = "INFO")]
        level: Level,

        #[arg(short, long)]
        message: String,

        /// Record attribute as key=value (repeatable)
        #[arg(short, long = "attr", value_parser = parse_attr)]
        attrs: Vec<Attr>,

        /// Group to nest the record's attributes under (repeatable, outermost first)
        #[arg(short, long = "group")]
        groups: Vec<String>,

        /// Write the entry to stdout instead of the backend
        #[arg(long)]
        stdout: bool,

        /// Dispatch on a background worker and drain before exiting
        #[arg(long = "async")]
        enable_async: bool,
    },
    /// Validate the configuration and print it
    Check,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(&cli.log_filter, None)?;

    let mut config = load_config(&cli.config)?;

    match cli.command {
        Commands::Check => {
            if config.client.bearer_token.is_some() {
                config.client.bearer_token = Some("<redacted>".to_string());
            }
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        Commands::Send {
            level,
            message,
            attrs,
            groups,
            stdout,
            enable_async,
        } => {
            config.enable_async |= enable_async;
            send(config, level, message, attrs, groups, stdout)?;
        }
    }

    Ok(())
}

fn send(
    config: HandlerConfig,
    level: Level,
    message: String,
    attrs: Vec<Attr>,
    groups: Vec<String>,
    stdout: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    // The HTTP sink blocks, so the runtime is only entered for draining.
    let rt = tokio::runtime::Runtime::new()?;
    let log_path = config.log_path();
    let options = Options::new(config).with_scheduler(Arc::new(TokioScheduler::new(rt.handle().clone())));

    let root = if stdout {
        CloudLoggingHandler::with_sink(options, Arc::new(WriterSink::stdout(log_path)))?
    } else {
        CloudLoggingHandler::new(options)?
    };

    let handler = groups.iter().fold(root.clone(), |h, group| h.with_group(group));
    if !handler.enabled(level) {
        eprintln!(
            "Skipped: level {} is below the configured minimum {}",
            level,
            handler.config().level
        );
    } else {
        handler.handle(Record::new(level, message).with_attrs(attrs))?;
    }

    rt.block_on(root.shutdown(false))?;
    Ok(())
}

fn parse_attr(s: &str) -> Result<Attr, String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid attribute '{}': expected key=value", s))?;
    if key.is_empty() {
        return Err(format!("invalid attribute '{}': empty key", s));
    }

    let attr = if let Ok(i) = value.parse::<i64>() {
        Attr::int(key, i)
    } else if let Ok(f) = value.parse::<f64>() {
        Attr::new(key, f)
    } else if let Ok(b) = value.parse::<bool>() {
        Attr::bool(key, b)
    } else {
        Attr::string(key, value)
    };
    Ok(attr)
}
