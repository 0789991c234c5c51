//! Interactive analysis session
//!
//! A small REPL over a ready pipeline: type a region (optionally followed by
//! `| question`) to get a scored analysis, or use one of the commands.

use crate::api::pipeline::AnalysisPipeline;
use crate::api::types::{AnalysisMode, AnalysisRequest};
use crate::error::Result;
use crate::utils::preview;
use std::io::{self, BufRead, Write};

/// One parsed line of user input
#[derive(Debug, Clone, PartialEq)]
enum Command {
    Quit,
    Help,
    Stats,
    Mode(Option<AnalysisMode>),
    Search(String),
    Analyze { region: String, query: String },
    Empty,
}

fn parse_command(input: &str) -> Command {
    let input = input.trim();
    if input.is_empty() {
        return Command::Empty;
    }

    let lower = input.to_lowercase();
    match lower.as_str() {
        "quit" | "exit" | "q" => return Command::Quit,
        "help" => return Command::Help,
        "stats" => return Command::Stats,
        _ => {}
    }

    if let Some(mode) = lower.strip_prefix("mode ") {
        return Command::Mode(mode.parse().ok());
    }
    if lower.starts_with("search ") {
        return Command::Search(input["search ".len()..].trim().to_string());
    }

    let (region, query) = input.split_once('|').unwrap_or((input, ""));
    Command::Analyze {
        region: region.trim().to_string(),
        query: query.trim().to_string(),
    }
}

fn print_help() {
    println!("\nCommands:");
    println!("  <region>            - Analyze a region (e.g. 강남구)");
    println!("  <region> | <query>  - Analyze with a follow-up question");
    println!("  mode summary|detailed - Switch analysis depth");
    println!("  search <query>      - Show raw retrieval results");
    println!("  stats               - Show pipeline status");
    println!("  help                - Show this help");
    println!("  exit/quit           - End session");
}

/// Run the interactive session until the user quits or stdin closes
pub async fn run_interactive(pipeline: &AnalysisPipeline, initial_mode: AnalysisMode) -> Result<()> {
    let mut mode = initial_mode;

    println!("💬 Interactive Analysis Mode");
    match pipeline.unavailable_reason() {
        None => println!(
            "   {} chunks indexed, model {}",
            pipeline.chunk_count(),
            pipeline.generator_model()
        ),
        Some(reason) => println!("   ⚠️ RAG unavailable: {}", reason),
    }
    println!("   Type 'help' for commands, 'exit' to quit");
    println!("{}", "-".repeat(50));

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("\n[{}] Region: ", mode);
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            println!();
            break;
        };

        match parse_command(&line?) {
            Command::Empty => continue,
            Command::Quit => {
                println!("Goodbye!");
                break;
            }
            Command::Help => print_help(),
            Command::Stats => {
                println!("\nPipeline Status:");
                println!("  Ready: {}", pipeline.is_ready());
                println!("  Indexed chunks: {}", pipeline.chunk_count());
                println!("  Top-k: {}", pipeline.top_k());
                println!("  Model: {}", pipeline.generator_model());
            }
            Command::Mode(Some(new_mode)) => {
                mode = new_mode;
                println!("Analysis mode set to {}", mode);
            }
            Command::Mode(None) => println!("Unknown mode; use 'summary' or 'detailed'"),
            Command::Search(query) => {
                let start_time = std::time::Instant::now();
                match pipeline.retrieve(&query, pipeline.top_k()).await {
                    Ok(results) => {
                        println!(
                            "Found {} results in {:.3}s:\n",
                            results.len(),
                            start_time.elapsed().as_secs_f64()
                        );
                        for (i, hit) in results.hits.iter().enumerate() {
                            println!(
                                "{}. [{:.3}] {} p.{}: {}",
                                i + 1,
                                hit.similarity,
                                hit.chunk.source,
                                hit.chunk.page + 1,
                                preview(&hit.chunk.text, 100)
                            );
                        }
                    }
                    Err(e) => println!("❌ Search error: {}", e),
                }
            }
            Command::Analyze { region, query } => {
                let start_time = std::time::Instant::now();
                let request = AnalysisRequest::new(region, query, mode);
                match pipeline.analyze(&request).await {
                    Ok(result) => {
                        println!("\nScore: {}/7\n\n{}", result.score, result.result);
                        println!("[{:.1}s]", start_time.elapsed().as_secs_f64());
                    }
                    Err(e) => println!("❌ Analysis failed: {}", e),
                }
            }
        }
    }

    Ok(())
}
