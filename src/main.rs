#![forbid(unsafe_code)]
//! # Dunning analysis CLI
//!
//! Compare the vocabulary of two corpora from the command line and print the terms most
//! distinctive of each.
//!
//! Each input may be a frequency table (`.csv`/`.tsv` with `term,count` rows, or `.json`), a
//! single document (`.txt`, `.md`, `.pdf`, `.docx`, `.odt`), or a directory of documents.
//!
//! ## Example
//! ```bash
//! cargo run --release -- female/ male/ --label-1 "Fem Author" --label-2 "Male Author" \
//!     --associated she --pos verbs --export-format csv
//! ```
//!
//! See `--help` for all available options.

use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use log::{error, info};

use dunning_analysis::{
    CompareOptions, Corpus, DEFAULT_MIN_COMBINED_COUNT, DirCache, ExportFormat, FrequencyTable,
    FsSource, LexiconTagger, PosFilter, PresentationConfig, Result, ResultSet, cached_or_compute,
    compare, export_results, load_frequency_table, print_failed_files, render, render_groups,
};

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// First corpus: frequency table, document, or directory (positive scores)
    corpus_1: PathBuf,

    /// Second corpus: frequency table, document, or directory (negative scores)
    corpus_2: PathBuf,

    /// Display name of the first corpus
    #[arg(long, default_value = "Corpus 1")]
    label_1: String,

    /// Display name of the second corpus
    #[arg(long, default_value = "Corpus 2")]
    label_2: String,

    /// Number of terms shown for each corpus
    #[arg(long, default_value_t = 20)]
    top: usize,

    /// Minimum combined count for a term to be scored
    #[arg(long, default_value_t = DEFAULT_MIN_COMBINED_COUNT)]
    min_count: u64,

    /// Only show adjectives, adverbs, verbs, pronouns, or a comma-separated tag list (e.g. NN,NNS)
    #[arg(long)]
    pos: Option<String>,

    /// Show the unfiltered tables followed by one pair per grammatical category
    #[arg(long, default_value_t = false, conflicts_with = "pos")]
    all_groups: bool,

    /// Term/tag lexicon (.csv or .tsv) used for part-of-speech filtering
    #[arg(long)]
    lexicon: Option<PathBuf>,

    /// Compare only the words following these terms (comma-separated) in documents
    #[arg(long, value_delimiter = ',')]
    associated: Vec<String>,

    /// With --associated: count all words within this many positions instead
    #[arg(long, requires = "associated")]
    window: Option<usize>,

    /// Directory for cached results
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Cache entry name (derived from the inputs if omitted)
    #[arg(long, requires = "cache_dir")]
    cache_key: Option<String>,

    /// Write freshly computed results to the cache
    #[arg(long, default_value_t = false, requires = "cache_dir")]
    store: bool,

    /// Also write results to a file (txt, csv, tsv, json)
    #[arg(long)]
    export_format: Option<ExportFormat>,

    /// Directory for exported files
    #[arg(long, default_value = ".")]
    output: PathBuf,
}

fn stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "corpus".to_string())
}

impl Cli {
    fn default_cache_key(&self) -> String {
        let mut key = format!(
            "dunning_{}_vs_{}",
            stem(&self.corpus_1),
            stem(&self.corpus_2)
        );
        if !self.associated.is_empty() {
            key.push_str(&format!("_associated_{}", self.associated.join("_")));
        }
        if let Some(w) = self.window {
            key.push_str(&format!("_word_window_{w}"));
        }
        key
    }

    fn table(&self, path: &Path) -> Result<FrequencyTable> {
        if self.associated.is_empty() {
            return load_frequency_table(&FsSource, path);
        }
        let corpus = Corpus::from_path(&FsSource, stem(path), path, None)?;
        if !corpus.failed_files.is_empty() {
            print_failed_files(&corpus.failed_files);
        }
        Ok(corpus.association_counts(self.associated.as_slice(), self.window))
    }

    fn results(&self) -> Result<ResultSet> {
        let options = CompareOptions {
            min_combined_count: self.min_count,
        };
        let compute = || {
            let t1 = self.table(&self.corpus_1)?;
            let t2 = self.table(&self.corpus_2)?;
            compare(&t1, &t2, &options)
        };
        match &self.cache_dir {
            Some(dir) => {
                let key = self
                    .cache_key
                    .clone()
                    .unwrap_or_else(|| self.default_cache_key());
                cached_or_compute(&DirCache::new(dir), &key, self.store, compute)
            }
            None => compute(),
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    // Parse the filter first so a typo fails before any work is done.
    let filter = cli.pos.as_deref().map(PosFilter::parse).transpose()?;
    let tagger = match &cli.lexicon {
        Some(path) => LexiconTagger::from_path(&FsSource, path)?,
        None => LexiconTagger::new(),
    };

    let results = cli.results()?;
    info!("{} terms scored", results.len());

    let config = PresentationConfig {
        top_n: cli.top,
        filter,
        ..PresentationConfig::default()
    }
    .with_labels(cli.label_1.clone(), cli.label_2.clone());

    if cli.all_groups {
        println!("{}", render_groups(&results, &config, &tagger));
    } else {
        println!("{}", render(&results, &config, &tagger));
    }

    if let Some(format) = cli.export_format {
        let stem = format!("{}_vs_{}", stem(&cli.corpus_1), stem(&cli.corpus_2));
        let path = export_results(&results, format, &config, &tagger, &cli.output, &stem)?;
        println!("Results written to {}", path.display());
    }
    Ok(())
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        error!("Error: {}", e);
        process::exit(1);
    }
}
