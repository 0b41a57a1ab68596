use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

use corridor_core::config::Config;
use corridor_core::error::Error;
use corridor_rag::{Answer, Pipeline, QueryOrchestrator};

#[derive(Parser)]
#[command(name = "corridor", version, about = "Grounded briefings over the wildlife corridor corpus")]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Directory holding config.toml / config.<env>.toml
    #[arg(long, global = true, default_value = ".")]
    config_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Rebuild a collection from every PDF, text and markdown file under the corpus path
    Index {
        corpus: Option<PathBuf>,
        collection: Option<String>,
    },
    /// Answer one question, or start an interactive session when none is given
    Query {
        question: Option<String>,
        #[arg(long)]
        collection: Option<String>,
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
        /// Also list the fragments the briefing was grounded on
        #[arg(long)]
        sources: bool,
    },
    /// Check that a collection exists and answers a sample query
    Verify { collection: Option<String> },
    /// Report availability of the index, embedder and generator
    Health,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).with_target(false).init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = Config::load_in(&cli.config_dir).context("loading configuration")?;
    let mut settings = config.settings()?;
    if let Command::Query { top_k: Some(k), .. } = &cli.command {
        settings.retrieval.top_k = *k;
    }
    let default_collection = settings.data.collection.clone();
    let pipeline = Pipeline::from_settings(settings)?;

    match cli.command {
        Command::Index { corpus, collection } => {
            let corpus = corpus.unwrap_or_else(|| pipeline.settings().corpus_dir());
            let collection = collection.unwrap_or(default_collection);
            info!(corpus = %corpus.display(), collection = %collection, "Indexing corpus");
            let report = pipeline.index_corpus(&corpus, &collection, true).await?;
            println!(
                "✅ Indexed {} chunks from {} documents into '{}' ({:.1}s)",
                report.chunk_count,
                report.document_count,
                report.collection,
                report.elapsed.as_secs_f64()
            );
            Ok(ExitCode::SUCCESS)
        }
        Command::Query { question, collection, sources, .. } => {
            let collection = collection.unwrap_or(default_collection);
            if !pipeline.index().exists(&collection).await? {
                return Err(Error::CollectionNotFound(collection).into());
            }
            let orchestrator = pipeline.query_orchestrator(&collection, pipeline.generator()?);
            match question {
                Some(q) => {
                    print_answer(&orchestrator, &q, sources).await?;
                    Ok(ExitCode::SUCCESS)
                }
                None => {
                    interactive(&orchestrator, sources).await?;
                    Ok(ExitCode::SUCCESS)
                }
            }
        }
        Command::Verify { collection } => {
            let collection = collection.unwrap_or(default_collection);
            let report = pipeline.verify(&collection).await?;
            println!("Sample query: {}", report.query);
            for (i, hit) in report.hits.iter().enumerate() {
                println!("\n[{}] {} (page {}) score={:.3}", i + 1, hit.source, hit.page.as_deref().unwrap_or("n/a"), hit.score);
                println!("    {}", hit.snippet);
            }
            if report.passed() {
                println!("\n✅ Collection '{}' is queryable", report.collection);
                Ok(ExitCode::SUCCESS)
            } else {
                eprintln!("Collection '{}' returned no results for the sample query", report.collection);
                Ok(ExitCode::FAILURE)
            }
        }
        Command::Health => {
            let health = pipeline.health().await;
            println!("index:     {}", health.index);
            println!("embedder:  {}", health.embedder);
            println!("generator: {}", health.generator);
            Ok(if health.all_available() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
        }
    }
}

async fn print_answer(orchestrator: &QueryOrchestrator, question: &str, sources: bool) -> anyhow::Result<()> {
    let answer = orchestrator.answer_with_sources(question).await?;
    render(&answer, sources);
    Ok(())
}

fn render(answer: &Answer, sources: bool) {
    println!("{}", answer.briefing);
    if sources && !answer.sources.is_empty() {
        println!("\nSources:");
        for (i, hit) in answer.sources.iter().enumerate() {
            println!("  [{}] {} (score {:.3})", i + 1, hit.entry.source_ref(), hit.score);
        }
    }
}

async fn interactive(orchestrator: &QueryOrchestrator, sources: bool) -> anyhow::Result<()> {
    let rule = "=".repeat(70);
    println!("\n{rule}\nKENYAN WILDLIFE CORRIDOR DEFENSE AGENT\n{rule}");
    println!("Ask questions about Kenyan land law, wildlife corridors, and ecology.");
    println!("Type 'exit' or 'quit' to stop.\n");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("Your Query: ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else { break };
        let query = line.trim();
        if ["exit", "quit", "q"].contains(&query.to_lowercase().as_str()) {
            println!("\nAgent shutting down. Goodbye!");
            break;
        }
        if query.is_empty() {
            println!("Please enter a valid query.\n");
            continue;
        }
        match orchestrator.answer_with_sources(query).await {
            Ok(answer) => {
                println!("\n{rule}\nBRIEFING DOCUMENT\n{rule}");
                render(&answer, sources);
                println!();
            }
            Err(e) => eprintln!("\nERROR: {e}\n"),
        }
    }
    Ok(())
}
