//! clearbin — command-line front end
//!
//! Classifies a still image with the clearbin detect service and prints the
//! recycling verdict.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use clearbin::capture::{CaptureController, FileCamera};
use clearbin::session::{ClassificationSession, Outcome, ProgressIndicator};
use clearbin::{
    CapturedImage, ClassificationClient, Config, FlashMode, ImageEncoder, PresentationChoice,
};

/// Clearbin CLI
#[derive(Parser)]
#[command(name = "clearbin")]
#[command(version = clearbin::PKG_VERSION)]
#[command(about = "Is it recyclable? Ask the clearbin detect service")]
struct Args {
    /// Config file (default: ~/.clearbin/config.toml, then /etc/clearbin/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Detect endpoint, overriding the config file
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Request timeout in seconds, overriding the config file
    #[arg(short, long)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Classify an image file
    Classify {
        /// Image to classify
        image: PathBuf,
        /// Capture with flash on
        #[arg(long)]
        flash: bool,
    },

    /// Print the data URI that would be sent for an image
    Encode {
        /// Image to encode
        image: PathBuf,
    },

    /// Show build information
    Version,
}

/// Progress line on stderr.
struct Spinner;

impl ProgressIndicator for Spinner {
    fn show(&self, label: &str) {
        eprint!("{label}");
        let _ = io::stderr().flush();
    }

    fn dismiss(&self) {
        eprintln!();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialise tracing (default: warn for CLI; override with RUST_LOG).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    match run(Args::parse()).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let mut config = Config::load(args.config.as_deref())?;
    if let Some(endpoint) = args.endpoint {
        config.client.endpoint = endpoint;
    }
    if let Some(timeout) = args.timeout {
        config.client.timeout_secs = timeout;
    }

    match args.command {
        Command::Version => {
            println!("clearbin {}", clearbin::version_string());
            Ok(ExitCode::SUCCESS)
        }

        Command::Encode { image } => {
            let bytes = std::fs::read(&image)?;
            let captured = CapturedImage::from_bytes(bytes)?;
            let encoder = ImageEncoder::with_media_type(&config.client.media_type);
            println!("{}", encoder.encode(&captured)?);
            Ok(ExitCode::SUCCESS)
        }

        Command::Classify { image, flash } => {
            let client = ClassificationClient::from_config(&config.client)?;
            let mut controller = CaptureController::from_config(FileCamera::new(image), &config);
            if flash {
                controller.set_flash_mode(FlashMode::On);
            }

            let mut session = ClassificationSession::new(Arc::new(client), Arc::new(Spinner));
            match session.run_round_trip(&controller).await? {
                Outcome::Presented(PresentationChoice::ShowMatch(state)) => {
                    println!("material:   {}", state.material);
                    println!(
                        "recyclable: {}",
                        if state.is_recyclable { "yes" } else { "no" }
                    );
                    Ok(ExitCode::SUCCESS)
                }
                Outcome::Presented(PresentationChoice::ShowNoMatch) => {
                    println!("no object detected");
                    Ok(ExitCode::SUCCESS)
                }
                Outcome::Failed {
                    message, retryable, ..
                } => {
                    eprintln!("{message}");
                    if retryable {
                        eprintln!("try again in a moment");
                    }
                    Ok(ExitCode::FAILURE)
                }
                Outcome::Discarded => {
                    eprintln!("classification cancelled");
                    Ok(ExitCode::FAILURE)
                }
            }
        }
    }
}
