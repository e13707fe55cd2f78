use adnova::Result;
use adnova::artifacts::ArtifactKind;
use adnova::commands::{
    add_artifact, get_artifact, init_config, search, show_config, show_status, similar, variations,
};
use adnova::config::{Config, get_config_dir};
use adnova::memory::{DEFAULT_SEARCH_RESULTS, DEFAULT_SIMILAR_CAMPAIGNS};
use adnova::variations::DEFAULT_VARIATION_COUNT;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "adnova")]
#[command(about = "Campaign artifact memory and ad copy variation tools")]
#[command(version)]
struct Cli {
    /// Directory holding config.toml and data/ (defaults to ~/.adnova)
    #[arg(long, global = true)]
    home: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show or initialize the configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
        /// Write a default config file
        #[arg(long)]
        init: bool,
    },
    /// Store and index an artifact read from a JSON file ("-" for stdin)
    Add {
        /// brief, ad, feedback or recommendation
        kind: ArtifactKind,
        file: PathBuf,
    },
    /// Print a stored artifact by id
    Get { kind: ArtifactKind, id: String },
    /// Find the artifacts most similar to a query
    Search {
        query: String,
        #[arg(short, long, default_value_t = DEFAULT_SEARCH_RESULTS)]
        k: usize,
    },
    /// Find past campaign briefs similar to a description
    Similar {
        description: String,
        #[arg(short, long, default_value_t = DEFAULT_SIMILAR_CAMPAIGNS)]
        k: usize,
    },
    /// Split generated ad copy into variations
    Variations {
        /// File with the raw generated text ("-" for stdin)
        file: PathBuf,
        #[arg(long, default_value_t = DEFAULT_VARIATION_COUNT)]
        count: usize,
    },
    /// Show artifact and index statistics
    Status,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let home = match cli.home {
        Some(home) => home,
        None => get_config_dir()?,
    };

    match cli.command {
        Commands::Config { show, init } => {
            if init {
                init_config(&Config::with_base_dir(&home))?;
            }
            if show || !init {
                show_config(&Config::load(&home)?)?;
            }
        }
        Commands::Add { kind, file } => {
            add_artifact(&Config::load(&home)?, kind, &file)?;
        }
        Commands::Get { kind, id } => {
            get_artifact(&Config::load(&home)?, kind, &id)?;
        }
        Commands::Search { query, k } => {
            search(&Config::load(&home)?, &query, k)?;
        }
        Commands::Similar { description, k } => {
            similar(&Config::load(&home)?, &description, k)?;
        }
        Commands::Variations { file, count } => {
            variations(&file, count)?;
        }
        Commands::Status => {
            show_status(&Config::load(&home)?)?;
        }
    }

    Ok(())
}
