//! Ready-made comparisons: author partitions, pronoun associations, and how two partitions write
//! about a given term.

use crate::FrequencyTable;
use crate::cache::ResultCache;
use crate::compare::{CompareOptions, ResultSet, cached_or_compute, compare};
use crate::corpus::Corpus;
use crate::error::Result;

/// Metadata field holding the author's gender.
pub const AUTHOR_GENDER: &str = "author_gender";

/// Terms used to find passages about money.
pub const MONEY_TERMS: &[&str] = &[
    "money", "dollars", "pounds", "euros", "dollar", "pound", "euro", "wealth", "income",
];

/// Where results are cached and how comparisons are run. Passed to every recipe.
#[derive(Clone, Copy, Default)]
pub struct AnalysisContext<'a> {
    pub cache: Option<&'a dyn ResultCache>,
    /// Write freshly computed results back to `cache`.
    pub store: bool,
    pub options: CompareOptions,
}

impl<'a> AnalysisContext<'a> {
    pub fn with_cache(cache: &'a dyn ResultCache, store: bool) -> Self {
        Self {
            cache: Some(cache),
            store,
            options: CompareOptions::default(),
        }
    }

    /// Compare the tables built by `tables`, unless `key` is already cached.
    ///
    /// Building the tables is usually the expensive part, so it only happens on a miss.
    fn run<F>(&self, key: &str, tables: F) -> Result<ResultSet>
    where
        F: FnOnce() -> (FrequencyTable, FrequencyTable),
    {
        let compute = || {
            let (t1, t2) = tables();
            compare(&t1, &t2, &self.options)
        };
        match self.cache {
            Some(cache) => cached_or_compute(cache, key, self.store, compute),
            None => compute(),
        }
    }
}

fn join_terms(terms: &[&str]) -> String {
    terms.join("_")
}

/// Whole-vocabulary comparison of two metadata partitions, e.g. female vs male authors.
/// Positive scores favour `value_1`.
pub fn compare_partitions(
    corpus: &Corpus,
    field: &str,
    value_1: &str,
    value_2: &str,
    ctx: &AnalysisContext<'_>,
) -> Result<ResultSet> {
    let part_1 = corpus.filter_by(field, value_1)?;
    let part_2 = corpus.filter_by(field, value_2)?;
    let key = format!("dunning_{value_1}_vs_{value_2}_{field}_{}", corpus.name);
    ctx.run(&key, || (part_1.word_counts(), part_2.word_counts()))
}

/// Female vs male authors. Positive scores favour female authors.
pub fn female_vs_male_authors(corpus: &Corpus, ctx: &AnalysisContext<'_>) -> Result<ResultSet> {
    compare_partitions(corpus, AUTHOR_GENDER, "female", "male", ctx)
}

/// Words following `word_1` vs words following `word_2` across the whole corpus.
pub fn compare_word_associations(
    corpus: &Corpus,
    word_1: &str,
    word_2: &str,
    ctx: &AnalysisContext<'_>,
) -> Result<ResultSet> {
    let key = format!(
        "dunning_{word_1}_vs_{word_2}_associated_words_{}",
        corpus.name
    );
    ctx.run(&key, || {
        (corpus.words_associated(word_1), corpus.words_associated(word_2))
    })
}

/// Words after "she" vs words after "he". Positive scores favour "she".
pub fn she_vs_he_associations(corpus: &Corpus, ctx: &AnalysisContext<'_>) -> Result<ResultSet> {
    compare_word_associations(corpus, "she", "he", ctx)
}

/// How two corpora write about `terms`.
///
/// Without `window`, the word directly following each occurrence of a term is counted; with
/// `window`, every word within that distance of an occurrence.
pub fn compare_association_between(
    terms: &[&str],
    corpus_1: &Corpus,
    corpus_2: &Corpus,
    window: Option<usize>,
    ctx: &AnalysisContext<'_>,
) -> Result<ResultSet> {
    let mut key = format!(
        "dunning_{}_associated_words_{}_vs_{}",
        join_terms(terms),
        corpus_1.name,
        corpus_2.name
    );
    if let Some(w) = window {
        key.push_str(&format!("_word_window_{w}"));
    }
    ctx.run(&key, || {
        (
            corpus_1.association_counts(terms, window),
            corpus_2.association_counts(terms, window),
        )
    })
}

/// How female vs male authors write about `terms`. Positive scores favour female authors.
pub fn author_gender_differences(
    corpus: &Corpus,
    terms: &[&str],
    window: Option<usize>,
    ctx: &AnalysisContext<'_>,
) -> Result<ResultSet> {
    let female = corpus.filter_by(AUTHOR_GENDER, "female")?;
    let male = corpus.filter_by(AUTHOR_GENDER, "male")?;
    compare_association_between(terms, &female, &male, window, ctx)
}
