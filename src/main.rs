use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::io::BufReader;
use std::path::Path;
use std::process::exit;

use modelmatcher::args::Args;
use modelmatcher::config::Parameters;
use modelmatcher::core::{CountMatrix, RateMatrix};
use modelmatcher::models;
use modelmatcher::readwrite::{read_count_matrix, read_model};
use modelmatcher::scorer::{ModelScorer, rank_scored};

fn main() {
    let args = Args::parse();
    setup_logger(&args);

    if let Err(message) = run(&args) {
        eprintln!("{}", message);
        exit(1);
    }
}

fn run(args: &Args) -> Result<(), String> {
    let parameters = match &args.settings {
        Some(path) => Parameters::read_from_file(path).map_err(|e| e.to_string())?,
        None => Parameters::default(),
    };

    let counts = load_counts(&args.counts)?;
    log::info!(
        "Loaded count matrix from {} with {} substitutions.",
        args.counts,
        counts.total()
    );

    let mut candidates = models::instantiate_all().map_err(|e| e.to_string())?;
    for path in &args.model {
        candidates.push(load_model(path)?);
    }
    log::info!("Scoring {} candidate models...", candidates.len());

    let bar = ProgressBar::new(candidates.len() as u64);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("[{bar:40}] {pos:>3}/{len:3} {msg}")
            .unwrap()
            .progress_chars("=> "),
    );

    let scorer = ModelScorer::new(parameters);
    let mut scored: Vec<(String, f64)> = Vec::with_capacity(candidates.len());
    for model in &candidates {
        bar.set_message(model.name().to_string());
        let score = scorer.score(model, &counts).map_err(|e| e.to_string())?;
        log::info!("Scored {}: {}", model.name(), score);
        scored.push((model.name().to_string(), score));
        bar.inc(1);
    }
    bar.finish_and_clear();

    println!("{:<6} {:<12} {:>16}", "rank", "model", "log-likelihood");
    for result in rank_scored(scored) {
        println!("{:<6} {:<12} {:>16.4}", result.rank, result.name, result.score);
    }

    Ok(())
}

fn load_counts(path: &str) -> Result<CountMatrix, String> {
    let file = fs::File::open(path).map_err(|e| format!("unable to open {}: {}", path, e))?;
    read_count_matrix(BufReader::new(file)).map_err(|e| e.to_string())
}

fn load_model(path: &str) -> Result<RateMatrix, String> {
    let name = Path::new(path)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(path)
        .to_string();
    let file = fs::File::open(path).map_err(|e| format!("unable to open {}: {}", path, e))?;
    read_model(BufReader::new(file), &name).map_err(|e| e.to_string())
}

fn setup_logger(args: &Args) {
    let log_level = match args.verbose {
        0 => log::LevelFilter::Info,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    simple_logging::log_to_file(args.log_file.as_str(), log_level).unwrap_or_else(|_| {
        eprintln!("Unable to open log file {}.", args.log_file);
        exit(1);
    });
}
