/// Corpus Stats: train a model and report its sample-size diagnostic.
///
/// Usage: corpus_stats --input <file.txt> [--order 2|3]
use clap::Parser;
use std::path::PathBuf;
use std::process;

use shaney::core::markov::MarkovTrainer;
use shaney::schema::order::Order;

#[derive(Parser)]
#[command(name = "corpus_stats")]
#[command(about = "Report how well a corpus supports sentence generation")]
struct Cli {
    /// Training text
    #[arg(short, long)]
    input: PathBuf,

    /// Markov order (2 or 3)
    #[arg(short, long, default_value = "2")]
    order: Order,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let text = std::fs::read_to_string(&cli.input).unwrap_or_else(|e| {
        eprintln!("Error reading input file '{}': {}", cli.input.display(), e);
        process::exit(1);
    });

    println!("Training order-{} model from '{}'...", cli.order, cli.input.display());
    let model = MarkovTrainer::train(&text, cli.order).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        process::exit(1);
    });

    let stats = model.stats();
    println!(
        "Model trained: {} windows, {} follower occurrences, {} sentence endings",
        stats.windows, stats.followers, stats.endings
    );
    println!("Average Sample Size: {:.3}", stats.mean_followers);
    println!("--> {}", stats.quality().describe());
}
