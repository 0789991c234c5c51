//! realestate-rag CLI application
//!
//! Command-line interface for the realestate-rag library.

use anyhow::Context;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use realestate_rag::utils::preview;
use realestate_rag::{
    AnalysisMode, AnalysisPipeline, AnalysisRequest, AnswerGenerator, Config, EmbeddingProvider,
    OpenAiEmbedder, OpenAiGenerator, run_interactive,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "realestate-rag")]
#[command(about = "Report-grounded real-estate outlook analysis with a 1-7 investment score")]
#[command(version)]
struct Cli {
    /// JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Source document(s), replacing the configured list
    #[arg(short, long = "document", global = true)]
    documents: Vec<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze the outlook for one or more regions
    Analyze {
        /// Region name(s), e.g. 강남구
        #[arg(short, long = "region", required = true)]
        regions: Vec<String>,

        /// Additional question appended to every request
        #[arg(short, long, default_value = "")]
        query: String,

        /// Analysis depth: summary or detailed
        #[arg(short, long, default_value = "detailed")]
        mode: AnalysisMode,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the chunks retrieved for a query
    Search {
        /// Search query
        query: String,

        /// Number of results to return
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
    },

    /// Interactive analysis session
    Chat {
        /// Initial analysis depth
        #[arg(short, long, default_value = "detailed")]
        mode: AnalysisMode,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => Config::default(),
    };
    if !cli.documents.is_empty() {
        config.documents = cli.documents.clone();
    }

    let pipeline = Arc::new(build_pipeline(&config).await?);

    match cli.command {
        Commands::Analyze {
            regions,
            query,
            mode,
            json,
        } => analyze_command(pipeline, regions, query, mode, json).await?,
        Commands::Search { query, top_k } => {
            let top_k = top_k.unwrap_or_else(|| pipeline.top_k());
            search_command(&pipeline, &query, top_k).await?;
        }
        Commands::Chat { mode } => run_interactive(&pipeline, mode).await?,
    }

    Ok(())
}

async fn build_pipeline(config: &Config) -> anyhow::Result<AnalysisPipeline> {
    println!("📚 Indexing {} document(s)...", config.documents.len());

    let embedder: Arc<dyn EmbeddingProvider> = Arc::new(OpenAiEmbedder::new(&config.embedding));
    let generator: Arc<dyn AnswerGenerator> = Arc::new(OpenAiGenerator::new(&config.generation));

    let progress_bar = ProgressBar::new(0);
    progress_bar.set_style(
        ProgressStyle::with_template("   {bar:40} {pos}/{len} chunks embedded ({elapsed})")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let bar = progress_bar.clone();
    let pipeline =
        AnalysisPipeline::initialize_with_progress(config, embedder, generator, move |done, total| {
            bar.set_length(total as u64);
            bar.set_position(done as u64);
        })
        .await
        .context("invalid pipeline configuration")?;
    progress_bar.finish_and_clear();

    match pipeline.unavailable_reason() {
        None => println!("✅ {} chunks indexed", pipeline.chunk_count()),
        Some(reason) => eprintln!("⚠️  RAG unavailable: {}", reason),
    }

    Ok(pipeline)
}

async fn analyze_command(
    pipeline: Arc<AnalysisPipeline>,
    regions: Vec<String>,
    query: String,
    mode: AnalysisMode,
    json: bool,
) -> anyhow::Result<()> {
    let requests: Vec<AnalysisRequest> = regions
        .into_iter()
        .map(|region| AnalysisRequest::new(region, query.clone(), mode))
        .collect();

    let analyses = requests.iter().map(|request| {
        let pipeline = Arc::clone(&pipeline);
        async move { pipeline.analyze(request).await }
    });
    let outcomes = futures::future::join_all(analyses).await;

    let mut failures = 0;
    for (request, outcome) in requests.iter().zip(outcomes) {
        match outcome {
            Ok(result) if json => {
                println!("{}", serde_json::to_string_pretty(&result)?);
            }
            Ok(result) => {
                println!("🏠 {} ({})", request.region, request.analysis_type);
                println!("   Score: {}/7", result.score);
                println!();
                println!("{}", result.result);
                println!();
            }
            Err(e) => {
                failures += 1;
                eprintln!("❌ {}: {}", request.region, e);
            }
        }
    }

    if failures == requests.len() {
        anyhow::bail!("all {} analyses failed", failures);
    }

    Ok(())
}

async fn search_command(pipeline: &AnalysisPipeline, query: &str, top_k: usize) -> anyhow::Result<()> {
    println!("🔍 Searching for: \"{}\"", query);

    let results = pipeline.retrieve(query, top_k).await?;

    if results.is_empty() {
        println!("❌ No results found");
        return Ok(());
    }

    println!("📋 Found {} results:", results.len());
    println!();

    for (i, hit) in results.hits.iter().enumerate() {
        println!(
            "{}. Score: {:.3}  ({} p.{})",
            i + 1,
            hit.similarity,
            hit.chunk.source,
            hit.chunk.page + 1
        );
        println!("   {}", preview(&hit.chunk.text, 200));
        println!();
    }

    Ok(())
}
