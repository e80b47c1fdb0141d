/// Shaney: train on a corpus and print generated sentences.
///
/// Usage: shaney <corpus.txt> [--order 2|3] [--count n] [--seed n] [--interactive]
///        shaney --raw "Some text. More text." --count 3
use clap::Parser;
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process;

use shaney::core::markov::MarkovTrainer;
use shaney::core::quote::truncate_words;
use shaney::schema::config::{ConfigError, ShaneyConfig};
use shaney::schema::order::Order;

#[derive(Parser)]
#[command(name = "shaney")]
#[command(about = "Generate sentences from a Markov chain trained on a corpus")]
#[command(version)]
struct Cli {
    /// Path to the training text (prompted for when omitted)
    source: Option<String>,

    /// Treat SOURCE as the corpus text itself instead of a file path
    #[arg(long)]
    raw: bool,

    /// RON configuration file; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Order: how many words to consider at a time (2 or 3)
    #[arg(short, long)]
    order: Option<u8>,

    /// Sentences to generate per round
    #[arg(short, long)]
    count: Option<usize>,

    /// RNG seed for reproducible output
    #[arg(short, long)]
    seed: Option<u64>,

    /// Truncate each sentence to at most this many words (0 for no limit)
    #[arg(short, long)]
    limit: Option<usize>,

    /// Keep generating until Q is entered
    #[arg(short, long)]
    interactive: bool,

    /// Log training diagnostics
    #[arg(short, long)]
    verbose: bool,
}

fn resolve_config(cli: &Cli) -> Result<ShaneyConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => ShaneyConfig::load_from_ron(path)?,
        None => ShaneyConfig::default(),
    };
    if let Some(order) = cli.order {
        config.order = Order::try_from(order)?;
    }
    if let Some(count) = cli.count {
        config.count = count;
    }
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    if let Some(limit) = cli.limit {
        config.word_limit = (limit > 0).then_some(limit);
    }
    config.verbose |= cli.verbose;
    Ok(config)
}

/// Read one trimmed line. A closed input is an `UnexpectedEof` error.
fn read_reply<R: BufRead>(input: &mut R) -> io::Result<String> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input closed"));
    }
    Ok(line.trim().to_string())
}

fn prompt(message: &str) -> io::Result<String> {
    print!("{}", message);
    io::stdout().flush()?;
    read_reply(&mut io::stdin().lock())
}

fn read_corpus(cli: &Cli) -> io::Result<String> {
    let source = match &cli.source {
        Some(source) => source.clone(),
        None => prompt("Enter name of a textfile to read: ")?,
    };
    if cli.raw {
        return Ok(source);
    }
    std::fs::read_to_string(Path::new(&source))
}

fn main() {
    let cli = Cli::parse();

    let config = resolve_config(&cli).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        process::exit(1);
    });

    let default_filter = if config.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let text = read_corpus(&cli).unwrap_or_else(|e| {
        eprintln!("Error reading corpus: {}", e);
        process::exit(1);
    });

    info!("Training order-{} model...", config.order);
    let model = MarkovTrainer::train(&text, config.order).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        process::exit(1);
    });
    model.stats().report();

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    loop {
        let sentences = model
            .generate_with_budget(config.count, config.max_steps, &mut rng)
            .unwrap_or_else(|e| {
                eprintln!("Error: {}", e);
                process::exit(1);
            });

        for sentence in &sentences {
            let sentence = sentence.trim();
            match config.word_limit {
                Some(limit) => println!("* {}", truncate_words(sentence, limit)),
                None => println!("* {}", sentence),
            }
        }

        if !cli.interactive {
            break;
        }
        match prompt("Press Enter key to continue, Q to quit: ") {
            Ok(selection) if !selection.eq_ignore_ascii_case("q") => println!(),
            _ => break,
        }
    }
}
