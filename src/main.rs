//! Typo tagger - edit-tag spelling correction from the terminal
//!
//! Loads a model directory once, then corrects a single sentence, every
//! line of a file, or lines typed on stdin.

use clap::Parser;
use std::error::Error;
use std::fs;
use std::io::{self, BufRead, Write};
use typo_tagger::cli::Display;
use typo_tagger::config::{ServiceConfig, DEFAULT_MODEL_DIR};
use typo_tagger::service::{CorrectionTally, TypoEndpoint};

#[derive(Parser, Debug)]
#[command(name = "typo-tagger")]
#[command(about = "Correct spelling mistakes with an edit-tag tagger")]
struct Args {
    /// Directory with tokenizer.json, tag2id.json and tagger.bin
    #[arg(short, long, default_value = DEFAULT_MODEL_DIR)]
    model_dir: String,

    /// Sentence to correct
    #[arg(short, long)]
    sentence: Option<String>,

    /// File with one sentence per line
    #[arg(short, long, conflicts_with = "sentence")]
    input_file: Option<String>,

    /// Alternatives shown per token
    #[arg(short, long, default_value = "3")]
    top_k: usize,

    /// Print JSON responses instead of the coloured view
    #[arg(long)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

/// Non-blank lines of a file
fn load_sentences(path: &str) -> Result<Vec<String>, Box<dyn Error>> {
    let content = fs::read_to_string(path)?;
    let sentences: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();

    if sentences.is_empty() {
        return Err(format!("No sentences found in {}", path).into());
    }
    Ok(sentences)
}

/// Correct one sentence and report it; returns false on a request error
fn run_one(
    endpoint: &TypoEndpoint,
    display: &mut Display<io::Stdout>,
    tally: &mut CorrectionTally,
    sentence: &str,
    args: &Args,
) -> Result<bool, Box<dyn Error>> {
    let request = serde_json::json!({ "sentence": sentence });
    match endpoint.check_typos(&request) {
        Ok(response) => {
            if args.json {
                println!("{}", serde_json::to_string(&response)?);
            } else {
                display.show_result(&response)?;
                println!();
            }
            tally.record(&response);
            Ok(true)
        }
        Err(e) => {
            if args.json {
                println!("{}", e.to_json());
            } else {
                display.show_error(&format!("[{}] {}", e.status_code(), e))?;
            }
            Ok(false)
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let level = if args.debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let config = ServiceConfig::from_model_dir(&args.model_dir).with_top_k(args.top_k.max(1));
    let endpoint = TypoEndpoint::load(&config);
    let mut display = Display::stdout();

    if !args.json {
        display.show_banner(&config.model_name, endpoint.is_ready())?;
    }
    if !endpoint.is_ready() {
        display.show_error(&format!(
            "could not load a model from {} (see --debug for details)",
            args.model_dir
        ))?;
        return Err("Model unavailable".into());
    }

    let mut tally = CorrectionTally::new();
    let mut failures = 0usize;

    if let Some(sentence) = &args.sentence {
        if !run_one(&endpoint, &mut display, &mut tally, sentence, &args)? {
            failures += 1;
        }
    } else if let Some(path) = &args.input_file {
        let sentences = load_sentences(path)?;
        if !args.json {
            println!("Checking {} sentences from {}\n", sentences.len(), path);
        }
        for sentence in &sentences {
            if !run_one(&endpoint, &mut display, &mut tally, sentence, &args)? {
                failures += 1;
            }
        }
    } else {
        if !args.json {
            println!("Type a sentence and press ENTER (Ctrl+D or 'quit' to exit)");
        }
        let stdin = io::stdin();
        loop {
            if !args.json {
                print!("> ");
                io::stdout().flush()?;
            }
            let mut line = String::new();
            if stdin.lock().read_line(&mut line)? == 0 {
                break;
            }
            let line = line.trim();
            if line == "quit" || line == "exit" {
                break;
            }
            if line.is_empty() {
                continue;
            }
            if !run_one(&endpoint, &mut display, &mut tally, line, &args)? {
                failures += 1;
            }
        }
    }

    if !args.json && tally.sentences() > 1 {
        display.show_tally(&tally, 5)?;
    }
    if failures > 0 {
        return Err(format!("{} request(s) failed", failures).into());
    }
    Ok(())
}
