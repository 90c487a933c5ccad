//! Dunning log-likelihood (G-test) scoring of a single term.

use crate::FrequencyTable;

/// `observed * ln(observed / expected)`, with the limit value 0 when nothing was observed.
fn g_contribution(observed: u64, expected: f64) -> f64 {
    if observed == 0 {
        0.0
    } else {
        let observed = observed as f64;
        observed * (observed / expected).ln()
    }
}

/// Signed Dunning log-likelihood of one term across two corpora.
///
/// The magnitude is the G statistic `2 * (a*ln(a/e1) + b*ln(b/e2))`, where `e1` and `e2` are the
/// counts expected if the term were spread across both corpora in proportion to their size.
///
/// Sign convention: the score is negated when corpus 1's contribution `a*ln(a/e1)` is negative,
/// i.e. when the term is under-represented in corpus 1. Positive scores therefore favour corpus 1
/// and negative scores favour corpus 2. This is a compatibility convention, not a statistically
/// canonical one.
///
/// A side with an observed count of 0 contributes 0 instead of `0 * ln(0)`. When `count_1` is 0
/// and `count_2` is not, corpus 1 is below expectation and the score is negative.
///
/// Both totals must be positive; zero totals are rejected upstream by [`crate::compare`].
///
/// ```
/// use dunning_analysis::dunning_log_likelihood;
/// let score = dunning_log_likelihood(21, 21, 1, 10);
/// assert!((score + 8.547243830635558).abs() < 1e-9);
/// ```
pub fn dunning_log_likelihood(total_1: u64, total_2: u64, count_1: u64, count_2: u64) -> f64 {
    debug_assert!(total_1 > 0 && total_2 > 0, "totals must be positive");

    let (c, d) = (total_1 as f64, total_2 as f64);
    let combined = (count_1 + count_2) as f64;
    let e1 = c * combined / (c + d);
    let e2 = d * combined / (c + d);

    let side_1 = g_contribution(count_1, e1);
    let side_2 = g_contribution(count_2, e2);
    let magnitude = 2.0 * (side_1 + side_2);

    let under_represented = if count_1 == 0 {
        count_2 > 0
    } else {
        side_1 < 0.0
    };

    if under_represented {
        -magnitude
    } else {
        magnitude
    }
}

/// Score a single term straight from two frequency tables.
///
/// Returns `None` if the term is missing from either table or one of the tables is empty.
pub fn score_term(table_1: &FrequencyTable, table_2: &FrequencyTable, term: &str) -> Option<f64> {
    let count_1 = *table_1.get(term)?;
    let count_2 = *table_2.get(term)?;
    let total_1: u64 = table_1.values().sum();
    let total_2: u64 = table_2.values().sum();
    if total_1 == 0 || total_2 == 0 {
        return None;
    }
    Some(dunning_log_likelihood(total_1, total_2, count_1, count_2))
}
