use clap::{Parser, Subcommand};
use std::path::PathBuf;
use vatika_support::Result;
use vatika_support::commands::{ask, chat, list_faq, show_knowledge};
use vatika_support::config::{Config, get_config_dir, run_interactive_config, show_config};

#[derive(Parser)]
#[command(name = "vatika-support")]
#[command(about = "Customer support assistant for the Aarogya Vatika Ayurvedic store")]
#[command(version)]
struct Cli {
    /// Directory holding config.toml (defaults to ~/.vatika-support)
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive support chat
    Chat,
    /// Answer a single question and exit
    Ask {
        /// The customer question
        query: String,
    },
    /// List the scripted FAQ answers in the order they are tried
    Faq,
    /// Show knowledge base sections
    Knowledge {
        /// Section to print as JSON, e.g. "shipping_delivery"
        section: Option<String>,
    },
    /// Configure the completion endpoint and retrieval settings
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config_dir = match cli.config_dir {
        Some(dir) => dir,
        None => get_config_dir()?,
    };

    match cli.command {
        Commands::Chat => {
            chat(&Config::load(&config_dir)?)?;
        }
        Commands::Ask { query } => {
            ask(&Config::load(&config_dir)?, &query)?;
        }
        Commands::Faq => {
            list_faq();
        }
        Commands::Knowledge { section } => {
            show_knowledge(section.as_deref())?;
        }
        Commands::Config { show } => {
            if show {
                show_config(&config_dir)?;
            } else {
                run_interactive_config(&config_dir)?;
            }
        }
    }

    Ok(())
}
