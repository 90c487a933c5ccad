#![forbid(unsafe_code)]
//! # Dunning analysis
//!
//! Which words are distinctive of one part of a corpus compared with another? Given two
//! word-frequency tables (female vs male authors, words after "she" vs words after "he", ...),
//! this crate scores every shared word with the Dunning log-likelihood test, ranks the scores for
//! each side, optionally keeps only one grammatical category, and renders the top terms as
//! fixed-width tables.
//!
//! ## Pipeline
//! - [`compare`]: two [`FrequencyTable`]s to a [`ResultSet`] of [`TermStatistic`]s.
//! - [`rank`]: top-N terms for one side, optionally restricted by a [`PosFilter`].
//! - [`render`]: both sides as text tables; [`export_results`] writes them to disk.
//!
//! Around the pipeline: [`DirCache`] keeps computed result sets between runs, [`Corpus`] builds
//! frequency tables from documents, and the [`analysis`] recipes tie everything together.
//!
//! ## Example
//! ```
//! use dunning_analysis::{
//!     CompareOptions, FrequencyTable, LexiconTagger, PresentationConfig, compare, render,
//! };
//!
//! let female: FrequencyTable = [("he", 1), ("she", 10), ("and", 10)]
//!     .into_iter().map(|(w, c)| (w.to_string(), c)).collect();
//! let male: FrequencyTable = [("he", 10), ("she", 1), ("and", 10)]
//!     .into_iter().map(|(w, c)| (w.to_string(), c)).collect();
//!
//! let results = compare(&female, &male, &CompareOptions::default()).unwrap();
//! assert!(results["she"].log_likelihood > 0.0);
//!
//! let config = PresentationConfig::default().with_labels("Female", "Male");
//! let report = render(&results, &config, &LexiconTagger::new());
//! assert!(report.contains("Dunning Log-Likelihood results for Female"));
//! ```

use std::collections::HashMap;

pub mod analysis;
pub mod cache;
pub mod compare;
pub mod corpus;
pub mod error;
mod office;
pub mod rank;
pub mod report;
pub mod score;
pub mod source;
pub mod tagger;

/// Occurrences of each term in one corpus partition.
pub type FrequencyTable = HashMap<String, u64>;

pub use analysis::AnalysisContext;
pub use cache::{CacheLookup, DirCache, ResultCache};
pub use compare::{
    CompareOptions, DEFAULT_MIN_COMBINED_COUNT, ResultSet, TermStatistic, cached_or_compute,
    compare, compare_cached,
};
pub use corpus::{Corpus, Document, count_words, load_frequency_table, trim_to_words};
pub use error::{DunningError, Result};
pub use office::{extract_text_from_docx, extract_text_from_odt};
pub use rank::{PosCategory, PosFilter, PosSelection, Side, rank, top_terms};
pub use report::{
    ExportFormat, PresentationConfig, csv_safe_cell, export_results, render, render_groups,
};
pub use score::{dunning_log_likelihood, score_term};
pub use source::{FsSource, TextSource, collect_files};
pub use tagger::{LexiconTagger, PENN_TAGS, Tagger};

/// Print the files that could not be read, one per line, to stderr.
pub fn print_failed_files(failed: &[(String, String)]) {
    eprintln!("Warning: {} file(s) could not be read:", failed.len());
    for (file, reason) in failed {
        eprintln!("  {file}: {reason}");
    }
}
