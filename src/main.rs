use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use vox_gateway::session::classify::{is_exit_command, is_stop_command, normalize};
use vox_gateway::{Config, Daemon};

/// Vox - wake-word gated voice session controller
#[derive(Parser)]
#[command(name = "vox", version, about)]
struct Cli {
    /// Path to a TOML config file (default: ~/.config/vox/config.toml)
    #[arg(short, long, env = "VOX_CONFIG")]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Show how an utterance would be classified by the session controller
    Classify {
        /// Utterance to classify
        text: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,vox_gateway=info",
        1 => "info,vox_gateway=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load(cli.config.as_deref())?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(Command::Classify { text }) = cli.command {
        classify(&config, &text);
        return Ok(());
    }

    Daemon::new(config).run()?;
    Ok(())
}

/// Diagnostic: print the classification of one utterance
fn classify(config: &Config, text: &str) {
    use vox_gateway::session::classify::{contains_wake_phrase, strip_wake_phrase};

    let phrases = &config.session.wake_phrases;
    println!("raw:        {text:?}");
    println!("normalized: {:?}", normalize(text));
    println!("stop:       {}", is_stop_command(text));
    println!("exit:       {}", is_exit_command(text));
    println!("wake:       {}", contains_wake_phrase(text, phrases));
    if contains_wake_phrase(text, phrases) {
        println!("command:    {:?}", strip_wake_phrase(text, phrases));
    }
}
