use clap::{Parser, Subcommand};
use std::collections::BTreeMap;

use ubt_telemetry::config::{ClientConfig, DispatchMode};
use ubt_telemetry::{ExtraMessage, LogLevel, TracedError, UbtClient};

#[derive(Parser)]
#[command(name = "ubt-cli")]
#[command(about = "Send a single telemetry message to a collector", long_about = None)]
struct Cli {
    /// Collector base URL.
    #[arg(short, long, default_value = "http://127.0.0.1:9200")]
    url: String,

    #[arg(long, default_value = "ubt-cli")]
    app_name: String,

    #[arg(long, default_value = env!("CARGO_PKG_VERSION"))]
    app_version: String,

    /// Dotted module name, e.g. booking.payment.
    #[arg(short, long, default_value = "")]
    module: String,

    /// Business info entries as key=value.
    #[arg(short, long = "info", value_parser = parse_key_value)]
    business_info: Vec<(String, String)>,

    /// Trace the collector call.
    #[arg(long)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a leveled message
    Log {
        /// debug, info, warn, error, critical, alert or fatal
        level: LogLevel,
        message: String,
    },
    /// Report an error with the CLI's call site as its stack
    Error { message: String },
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got '{s}'"))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    if cli.debug {
        ubt_telemetry::observability::logging::init("debug");
    }

    let config = ClientConfig {
        server_url: cli.url,
        app_name: cli.app_name,
        app_version: cli.app_version,
        debug: cli.debug,
        mode: DispatchMode::Inline,
        ..Default::default()
    };
    let client = UbtClient::new(config)?;

    let extra = ExtraMessage {
        business_info: cli.business_info.into_iter().collect::<BTreeMap<_, _>>(),
        module: cli.module,
        log_type: String::new(),
    };

    match cli.command {
        Commands::Log { level, message } => client.log(level, message, Some(extra)).await,
        Commands::Error { message } => {
            let err = TracedError::new(message);
            client.send_error(&err, Some(extra)).await;
        }
    }

    let Some(recorder) = client.recorder() else {
        return Ok(());
    };
    println!("sent: {}", recorder.last_message());
    match recorder.last_error() {
        Some(error) => {
            eprintln!("Error: {}", error);
            std::process::exit(1);
        }
        None => println!("collector: {}", recorder.last_response()),
    }
    Ok(())
}
