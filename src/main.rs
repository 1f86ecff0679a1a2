use clap::{Parser, Subcommand};
use docs_qa::Result;
use docs_qa::commands::{ask, show_config};

#[derive(Parser)]
#[command(name = "docs-qa")]
#[command(about = "Ask questions against indexed documentation with cited answers")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask a question against the knowledge base
    Ask {
        /// The question to answer
        question: String,
        /// Maximum number of cited sources
        #[arg(long)]
        max_sources: Option<usize>,
        /// Restrict to a source kind, e.g. "tutorial" or "faq"
        #[arg(long)]
        source_kind: Option<String>,
        /// Restrict to content for a specific product version
        #[arg(long)]
        version: Option<String>,
    },
    /// Show the active configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Ask {
            question,
            max_sources,
            source_kind,
            version,
        } => {
            ask(&question, max_sources, source_kind, version).await?;
        }
        Commands::Config => {
            show_config()?;
        }
    }

    Ok(())
}
