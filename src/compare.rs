//! Whole-vocabulary comparison of two frequency tables.

use std::collections::BTreeMap;

use log::{debug, info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::FrequencyTable;
use crate::cache::{CacheLookup, ResultCache};
use crate::error::{DunningError, Result};
use crate::score::dunning_log_likelihood;

/// Combined occurrences below which a term is considered too noisy to score.
pub const DEFAULT_MIN_COMBINED_COUNT: u64 = 10;

/// Log-likelihood score of one shared term plus the counts it was computed from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermStatistic {
    pub term: String,
    /// Positive: over-represented in corpus 1. Negative: over-represented in corpus 2.
    pub log_likelihood: f64,
    pub count_total: u64,
    pub count_1: u64,
    pub count_2: u64,
    pub freq_total: f64,
    pub freq_1: f64,
    pub freq_2: f64,
}

/// Scored terms keyed by term. Ordered by term so that iteration, and hence tie order when
/// ranking, is reproducible.
pub type ResultSet = BTreeMap<String, TermStatistic>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompareOptions {
    pub min_combined_count: u64,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            min_combined_count: DEFAULT_MIN_COMBINED_COUNT,
        }
    }
}

/// Score every term of `table_1` that also occurs in `table_2`.
///
/// Only `table_1`'s keys are visited: a term found only in `table_2` never appears in the result,
/// even if `table_2`'s vocabulary is larger. Terms whose combined count is below
/// `options.min_combined_count` are dropped.
///
/// Fails with [`DunningError::EmptyTable`] if either table sums to zero.
pub fn compare(
    table_1: &FrequencyTable,
    table_2: &FrequencyTable,
    options: &CompareOptions,
) -> Result<ResultSet> {
    let total_1: u64 = table_1.values().sum();
    let total_2: u64 = table_2.values().sum();
    if total_1 == 0 {
        return Err(DunningError::EmptyTable("corpus 1"));
    }
    if total_2 == 0 {
        return Err(DunningError::EmptyTable("corpus 2"));
    }
    let grand_total = (total_1 + total_2) as f64;

    let results: ResultSet = table_1
        .par_iter()
        .filter_map(|(term, &count_1)| {
            let count_2 = *table_2.get(term)?;
            let count_total = count_1 + count_2;
            if count_total < options.min_combined_count {
                return None;
            }
            let stat = TermStatistic {
                term: term.clone(),
                log_likelihood: dunning_log_likelihood(total_1, total_2, count_1, count_2),
                count_total,
                count_1,
                count_2,
                freq_total: count_total as f64 / grand_total,
                freq_1: count_1 as f64 / total_1 as f64,
                freq_2: count_2 as f64 / total_2 as f64,
            };
            Some((term.clone(), stat))
        })
        .collect();

    debug!(
        "compared {} terms ({} tokens) against {} terms ({} tokens): {} scored",
        table_1.len(),
        total_1,
        table_2.len(),
        total_2,
        results.len()
    );
    Ok(results)
}

/// [`compare`], but consult `cache` under `key` first and optionally store the fresh result.
pub fn compare_cached(
    table_1: &FrequencyTable,
    table_2: &FrequencyTable,
    options: &CompareOptions,
    cache: &dyn ResultCache,
    key: &str,
    store: bool,
) -> Result<ResultSet> {
    cached_or_compute(cache, key, store, || compare(table_1, table_2, options))
}

/// Return the entry cached under `key`, or run `compute` and optionally store its result.
///
/// An unreadable or corrupt cache entry is logged and treated like a miss. A failed write is
/// logged and does not fail the comparison.
pub fn cached_or_compute<F>(
    cache: &dyn ResultCache,
    key: &str,
    store: bool,
    compute: F,
) -> Result<ResultSet>
where
    F: FnOnce() -> Result<ResultSet>,
{
    match cache.load(key) {
        Ok(CacheLookup::Found(results)) => {
            info!("using cached results for '{key}'");
            return Ok(results);
        }
        Ok(CacheLookup::NotFound) => {
            info!("no cached results for '{key}', running comparison");
        }
        Err(e) => {
            warn!("ignoring cache entry '{key}': {e}");
        }
    }

    let results = compute()?;

    if store {
        match cache.store(&results, key) {
            Ok(path) => info!("stored results for '{key}' at {}", path.display()),
            Err(e) => warn!("could not store results for '{key}': {e}"),
        }
    }
    Ok(results)
}
