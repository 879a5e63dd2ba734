mod commands_cmd;
mod config;
mod init_cmd;
mod run_cmd;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;

use tavern_config::DEFAULT_TOKEN_VAR;
use tavern_logging::init_logger;

use config::CliConfig;

#[derive(Parser)]
#[command(name = "tavern")]
#[command(about = "tavern, a dice and utility chat bot")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect the bots in the manifest to Discord
    Run {
        /// Directory holding bots.json and per-bot configs
        #[arg(long)]
        config_dir: Option<PathBuf>,
        /// Only start the bot at this manifest position
        #[arg(long)]
        bot: Option<usize>,
    },
    /// Write a starter bots manifest
    Init {
        #[arg(long)]
        config_dir: Option<PathBuf>,
        /// Display name of the bot
        #[arg(long, default_value = "Tavern")]
        name: String,
        /// Environment variable that will hold the bot token
        #[arg(long, default_value = DEFAULT_TOKEN_VAR)]
        token_var: String,
        /// Overwrite an existing manifest
        #[arg(long)]
        force: bool,
    },
    /// Chat with one bot locally through stdin
    Console {
        #[arg(long)]
        config_dir: Option<PathBuf>,
        #[arg(long, default_value_t = 0)]
        bot: usize,
        /// Username to send messages as
        #[arg(long, default_value = "you")]
        user: String,
    },
    /// List the built-in commands
    Commands,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let _ = dotenvy::dotenv();
    let config = CliConfig::from_env();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config_dir, bot } => {
            init_logger(&config.log_dir, &config.log_level);
            run_cmd::run(&config.config_dir(config_dir), bot).await
        }
        Commands::Init {
            config_dir,
            name,
            token_var,
            force,
        } => {
            init_logger(&config.log_dir, &config.log_level);
            let path = init_cmd::run(&config.config_dir(config_dir), &name, &token_var, force).await?;
            info!(path = %path.display(), "Wrote bots manifest");
            println!("Wrote {}", path.display());
            println!("Set {token_var} in your environment (or .env), then run `tavern run`.");
            Ok(ExitCode::SUCCESS)
        }
        Commands::Console {
            config_dir,
            bot,
            user,
        } => {
            init_logger(&config.log_dir, &config.log_level);
            run_cmd::console(&config.config_dir(config_dir), bot, &user).await
        }
        Commands::Commands => {
            print!("{}", commands_cmd::render());
            Ok(ExitCode::SUCCESS)
        }
    }
}
