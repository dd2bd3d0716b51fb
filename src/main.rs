use anyhow::Result;
use clap::{Parser, Subcommand};
use murmur::config::{Config, ConfigOverrides};
use murmur::{app, commands, logging};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "murmur")]
#[command(version)]
#[command(about = "Chat with a remote endpoint from your terminal", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Chat endpoint URL (overrides config and MURMUR_ENDPOINT)
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Config file to use instead of ~/.murmur/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Milliseconds between two reveal steps
    #[arg(long, global = true)]
    reveal_interval_ms: Option<u64>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    /// Log file for the interactive session (default ~/.murmur/murmur.log)
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Send one message and print the reply
    Ask {
        /// Message text
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Print the effective configuration
    Config {
        /// Also write it to the config file
        #[arg(long)]
        write: bool,
    },
}

impl Cli {
    fn config_path(&self) -> Result<PathBuf> {
        match &self.config {
            Some(path) => Ok(path.clone()),
            None => Config::default_path(),
        }
    }

    fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_from(&self.config_path()?)?;
        config.apply_overrides(&ConfigOverrides {
            endpoint: self.endpoint.clone(),
            reveal_interval_ms: self.reveal_interval_ms,
            request_timeout_secs: self.timeout_secs,
        });
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = cli.load_config()?;

    match &cli.command {
        None => {
            let log_path = match &cli.log_file {
                Some(path) => path.clone(),
                None => Config::home_dir()?.join("murmur.log"),
            };
            let _guard = logging::init_file_logging(&log_path)?;
            app::run(config).await?;
            Ok(ExitCode::SUCCESS)
        }
        Some(Commands::Ask { text }) => {
            logging::init_stderr_logging()?;
            commands::ask(&config, &text.join(" ")).await
        }
        Some(Commands::Config { write }) => {
            let path = cli.config_path()?;
            commands::show_config(&config, write.then_some(path.as_path()))?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
