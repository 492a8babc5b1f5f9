use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use newsquery::config::Config;
use newsquery::{NewsQuery, OntologyResolver};

#[derive(Parser)]
#[command(
    name = "newsquery",
    version,
    about = "Query the BBC News Labs semantic news API and the Juicer",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// TOML configuration file (defaults to NEWSQUERY_* environment variables)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// API key, overriding the configured one
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json)
    #[arg(long, global = true)]
    log_format: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the sources the semantic API indexes
    Sources,

    /// Show a concept and recent articles about it
    Concept {
        /// Concept URI, e.g. http://dbpedia.org/resource/Europe
        uri: String,

        /// Maximum number of articles
        #[arg(short, long)]
        limit: Option<u32>,
    },

    /// Search concepts by free text
    Concepts {
        /// Keywords to search for
        keywords: String,

        /// Maximum number of results
        #[arg(short, long)]
        limit: Option<u32>,

        /// Restrict to an ontology class (repeatable)
        #[arg(long = "class")]
        classes: Vec<String>,
    },

    /// Concepts mentioned alongside a concept
    Cooccurrences {
        /// Concept URI
        uri: String,

        /// Maximum number of results
        #[arg(short, long)]
        limit: Option<u32>,

        /// Restrict to an ontology class (repeatable)
        #[arg(long = "type")]
        types: Vec<String>,

        /// Only count articles from this source
        #[arg(long)]
        source: Option<String>,
    },

    /// Articles tagged with one or more concepts
    Articles {
        /// Concept URIs
        #[arg(required = true)]
        uris: Vec<String>,

        /// Maximum number of results
        #[arg(short, long)]
        limit: Option<u32>,

        /// Number of results to skip
        #[arg(long)]
        offset: Option<u32>,
    },

    /// Total mentions of a concept
    Occurrences {
        /// Concept URI
        uri: String,
    },

    /// Daily mentions of a concept over a date range
    Timeline {
        /// Concept URI
        uri: String,

        /// First day (YYYY-MM-DD), defaults to today
        #[arg(long)]
        start: Option<String>,

        /// Day after the last one (YYYY-MM-DD), defaults to today
        #[arg(long)]
        end: Option<String>,

        /// Only count articles from this source
        #[arg(long)]
        source: Option<String>,
    },

    /// Ancestor classes of a DBpedia ontology class
    Ancestors {
        /// Class URI, e.g. http://dbpedia.org/ontology/RecordLabel
        class_uri: String,
    },

    /// Keyword search on the Juicer
    Search {
        /// Search text
        text: String,

        /// Published on or after (YYYY-MM-DD)
        #[arg(long)]
        after: Option<String>,

        /// Published before (YYYY-MM-DD)
        #[arg(long)]
        before: Option<String>,

        /// Restrict to a Juicer product (repeatable)
        #[arg(long = "source")]
        sources: Vec<String>,
    },

    /// Articles similar to an article or to a passage of text
    Similar {
        /// Juicer article id
        #[arg(long, required_unless_present = "text", conflicts_with = "text")]
        id: Option<String>,

        /// Free text to match against
        #[arg(long)]
        text: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };
    if let Some(api_key) = cli.api_key.clone() {
        config.api.api_key = api_key;
    }

    let log_format = cli
        .log_format
        .clone()
        .unwrap_or_else(|| config.logging.format.clone());
    setup_tracing(&log_format, &config.logging.level, cli.verbose)?;

    // Offline: no client needed
    if let Commands::Ancestors { class_uri } = &cli.command {
        let resolver = OntologyResolver::builtin()?;
        return print_json(&resolver.resolve_ancestors(class_uri));
    }

    if config.api.api_key.is_empty() {
        tracing::warn!("No API key configured; upstream requests will likely be rejected");
    }

    let client = NewsQuery::connect(config)
        .await
        .context("Failed to build client")?;

    run(&client, cli.command).await
}

async fn run(client: &NewsQuery, command: Commands) -> Result<()> {
    match command {
        Commands::Sources => print_json(&client.get_sources().await),

        Commands::Concept { uri, limit } => {
            tracing::info!(uri = %uri, limit = ?limit, "Fetching concept");
            match client.get_concept(&uri, limit).await {
                Some(concept) => print_json(&concept),
                None => anyhow::bail!("Concept not found: {uri}"),
            }
        }

        Commands::Concepts {
            keywords,
            limit,
            classes,
        } => {
            tracing::info!(keywords = %keywords, limit = ?limit, "Searching concepts");
            let classes = as_strs(&classes);
            print_json(&client.get_concepts(&keywords, limit, &classes).await)
        }

        Commands::Cooccurrences {
            uri,
            limit,
            types,
            source,
        } => {
            let types = as_strs(&types);
            let result = client
                .get_co_occurring_concepts(&uri, limit, &types, source.as_deref())
                .await;
            print_json(&result)
        }

        Commands::Articles {
            uris,
            limit,
            offset,
        } => {
            let uris = as_strs(&uris);
            print_json(&client.get_articles_by_concept(&uris, limit, offset).await)
        }

        Commands::Occurrences { uri } => print_json(&client.get_concept_occurrences(&uri).await),

        Commands::Timeline {
            uri,
            start,
            end,
            source,
        } => {
            tracing::info!(uri = %uri, start = ?start, end = ?end, "Building timeline");
            let series = client
                .occurrences_over_time(&uri, start.as_deref(), end.as_deref(), source.as_deref())
                .await?;
            print_json(&series)
        }

        Commands::Ancestors { class_uri } => print_json(&client.resolve_ancestors(&class_uri)),

        Commands::Search {
            text,
            after,
            before,
            sources,
        } => {
            let sources = as_strs(&sources);
            let hits = client
                .search_articles(&text, after.as_deref(), before.as_deref(), &sources)
                .await?;
            print_json(&hits)
        }

        Commands::Similar { id, text } => {
            let hits = match (id, text) {
                (Some(id), _) => client.get_similar_articles(&id).await,
                (None, Some(text)) => client.get_similar_articles_from_text(&text).await,
                (None, None) => anyhow::bail!("Either --id or --text is required"),
            };
            print_json(&hits)
        }
    }
}

fn as_strs(values: &[String]) -> Vec<&str> {
    values.iter().map(String::as_str).collect()
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn setup_tracing(format: &str, level: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("newsquery=debug,warn")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .or_else(|_| tracing_subscriber::EnvFilter::try_new(format!("newsquery={level},warn")))
            .context("Invalid log level")?
    };

    // Results go to stdout, logs to stderr
    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    Ok(())
}
