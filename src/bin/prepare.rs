//! Dataset preparation binary for the edit-tag tagger
//!
//! Aligns a CSV of (original, corrected) sentence pairs into per-word edit
//! tags and writes a token-classification dataset.
//! Usage: cargo run --bin prepare -- --csv data/pairs.csv --out data/tagged --tokenizer tokenizer.json

use clap::Parser;
use std::error::Error;
use std::fs;
use std::path::Path;
use typo_tagger::config::{TOKENIZER_FILE, WEIGHTS_FILE};
use typo_tagger::data::{read_pairs, DatasetConfig, TagDatasetBuilder};
use typo_tagger::model::{TaggerBundle, TaggerConfig};
use typo_tagger::tokenizer::{ChunkTokenizer, HfTokenizer, SubwordTokenizer};

#[derive(Parser, Debug)]
#[command(name = "Typo Tagger - Dataset Preparation")]
#[command(about = "Turn sentence pairs into an edit-tag token classification dataset")]
struct Args {
    /// CSV with original_text and corrected_text columns
    #[arg(short, long)]
    csv: String,

    /// Output directory
    #[arg(short, long)]
    out: String,

    /// tokenizer.json to encode with (fixed-width chunks when omitted)
    #[arg(short, long)]
    tokenizer: Option<String>,

    /// Sequence length after truncation/padding
    #[arg(long, default_value = "128")]
    max_length: usize,

    /// Validation fraction (0 disables the split)
    #[arg(long, default_value = "0.05")]
    val_split: f64,

    /// Shuffle seed
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Minimal-edit ceiling (distance / longest side)
    #[arg(long, default_value = "0.30")]
    threshold: f64,

    /// Also write randomly initialised tagger.bin with this hidden size
    #[arg(long)]
    init_hidden: Option<usize>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn load_tokenizer(args: &Args) -> Result<Box<dyn SubwordTokenizer>, Box<dyn Error>> {
    match &args.tokenizer {
        Some(path) => {
            let tokenizer = HfTokenizer::from_file(path)?;
            println!("   Vocab size: {}", tokenizer.vocab_size());
            Ok(Box::new(tokenizer))
        }
        None => {
            log::warn!("no --tokenizer given; using the fixed-width chunk tokenizer");
            let tokenizer = ChunkTokenizer::new(3, 32_000)?;
            println!("   Chunk tokenizer: {} ids", tokenizer.vocab_size());
            Ok(Box::new(tokenizer))
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    println!("📝 Typo Tagger - Dataset Preparation");
    println!("====================================\n");

    let config = DatasetConfig::default()
        .with_max_length(args.max_length)
        .with_val_split(args.val_split)
        .with_seed(args.seed)
        .with_threshold(args.threshold);
    config.validate()?;

    println!("📚 Loading pairs from: {}", args.csv);
    let pairs = read_pairs(&args.csv)?;
    println!("   Loaded {} pairs", pairs.len());

    println!("\n🔤 Initialising tokenizer...");
    let tokenizer = load_tokenizer(&args)?;

    let mut builder = TagDatasetBuilder::new(tokenizer.as_ref(), config);
    let pairs = builder.filter_pairs(pairs);
    println!("   {} minimal-edit pairs retained", pairs.len());
    if pairs.is_empty() {
        return Err("no pairs left after the minimal-edit filter".into());
    }

    println!("\n🏷️  Diff-tagging and encoding...");
    let splits = builder.build_dataset(&pairs)?;
    let vocab = builder
        .vocab()
        .ok_or("tag vocabulary was not built")?;
    println!("   Tag vocab size: {}", vocab.len());
    println!(
        "   Train: {} | Validation: {}",
        splits.train.len(),
        splits.validation.as_ref().map_or(0, Vec::len)
    );
    if args.verbose {
        let preview: Vec<String> = vocab.tags().iter().take(20).map(|t| t.to_string()).collect();
        println!("   Tags: {:?}", preview);
    }

    println!("\n💾 Saving dataset to: {}", args.out);
    splits.save(&args.out, vocab)?;
    let out = Path::new(&args.out);

    if let Some(path) = &args.tokenizer {
        fs::copy(path, out.join(TOKENIZER_FILE))?;
        println!("   Copied tokenizer to {}", out.join(TOKENIZER_FILE).display());
    }

    if let Some(hidden_size) = args.init_hidden {
        let bundle = TaggerBundle::initialize(TaggerConfig {
            vocab_size: tokenizer.vocab_size(),
            hidden_size,
            num_tags: vocab.len(),
        })?;
        bundle.save(out.join(WEIGHTS_FILE))?;
        println!(
            "   Initial weights: {} parameters -> {}",
            bundle.parameter_count(),
            out.join(WEIGHTS_FILE).display()
        );
    }

    println!("\n✅ Done");
    Ok(())
}
