//! Top-N selection of scored terms, optionally restricted to a grammatical category.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::compare::{ResultSet, TermStatistic};
use crate::error::{DunningError, Result};
use crate::tagger::{Tagger, is_penn_tag};

/// Which corpus the ranked terms should be distinctive of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Most positive scores first.
    Corpus1,
    /// Most negative scores first.
    Corpus2,
}

/// Named grammatical categories, each standing for a fixed set of Penn Treebank tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PosCategory {
    Adjectives,
    Adverbs,
    Verbs,
    Pronouns,
}

impl PosCategory {
    /// In the order reports traditionally list them.
    pub const ALL: [PosCategory; 4] = [
        PosCategory::Verbs,
        PosCategory::Adjectives,
        PosCategory::Pronouns,
        PosCategory::Adverbs,
    ];

    pub fn tags(self) -> &'static [&'static str] {
        match self {
            PosCategory::Adjectives => &["JJ", "JJR", "JJS"],
            PosCategory::Adverbs => &["RB", "RBR", "RBS", "WRB"],
            PosCategory::Verbs => &["VB", "VBD", "VBG", "VBN", "VBP", "VBZ"],
            PosCategory::Pronouns => &["PRP", "PRP$", "WP", "WP$"],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PosCategory::Adjectives => "adjectives",
            PosCategory::Adverbs => "adverbs",
            PosCategory::Verbs => "verbs",
            PosCategory::Pronouns => "pronouns",
        }
    }
}

impl fmt::Display for PosCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PosCategory {
    type Err = DunningError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "adjectives" => Ok(PosCategory::Adjectives),
            "adverbs" => Ok(PosCategory::Adverbs),
            "verbs" => Ok(PosCategory::Verbs),
            "pronouns" => Ok(PosCategory::Pronouns),
            _ => Err(DunningError::UnknownPosFilter(s.to_string())),
        }
    }
}

/// Restricts ranking to terms whose tag is in a set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PosFilter {
    Category(PosCategory),
    Tags(BTreeSet<String>),
}

impl PosFilter {
    /// Parse a category name (`"verbs"`) or a comma-separated tag list (`"NN,NNS"`).
    ///
    /// Anything else is an error rather than "no restriction", so a misspelled category cannot
    /// silently widen the analysis to every term.
    pub fn parse(s: &str) -> Result<Self> {
        if let Ok(category) = s.parse::<PosCategory>() {
            return Ok(PosFilter::Category(category));
        }
        let tags: BTreeSet<String> = s
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();
        if tags.is_empty() || !tags.iter().all(|t| is_penn_tag(t)) {
            return Err(DunningError::UnknownPosFilter(s.to_string()));
        }
        Ok(PosFilter::Tags(tags))
    }

    pub fn accepts(&self, tag: &str) -> bool {
        match self {
            PosFilter::Category(c) => c.tags().contains(&tag),
            PosFilter::Tags(tags) => tags.contains(tag),
        }
    }
}

impl From<PosCategory> for PosFilter {
    fn from(c: PosCategory) -> Self {
        PosFilter::Category(c)
    }
}

impl fmt::Display for PosFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PosFilter::Category(c) => write!(f, "{c}"),
            PosFilter::Tags(tags) => {
                let list: Vec<&str> = tags.iter().map(String::as_str).collect();
                write!(f, "{}", list.join(", "))
            }
        }
    }
}

/// A filter together with the tagger that classifies terms for it.
#[derive(Clone, Copy)]
pub struct PosSelection<'a> {
    pub filter: &'a PosFilter,
    pub tagger: &'a dyn Tagger,
}

impl PosSelection<'_> {
    fn keeps(&self, term: &str) -> bool {
        self.filter.accepts(&self.tagger.tag(term))
    }
}

/// The `top_n` most distinctive terms for `side`.
///
/// With a [`PosSelection`], the filter is applied while walking the sorted list, so the result
/// holds up to `top_n` matching terms rather than the matching subset of the unfiltered top-N.
/// The sort is stable over the term-ordered result set: equal scores come out in term order.
pub fn rank<'r>(
    results: &'r ResultSet,
    top_n: usize,
    side: Side,
    pos: Option<PosSelection<'_>>,
) -> Vec<(&'r str, &'r TermStatistic)> {
    let mut sorted: Vec<(&'r str, &'r TermStatistic)> =
        results.iter().map(|(k, v)| (k.as_str(), v)).collect();
    match side {
        Side::Corpus1 => {
            sorted.sort_by(|a, b| b.1.log_likelihood.total_cmp(&a.1.log_likelihood))
        }
        Side::Corpus2 => {
            sorted.sort_by(|a, b| a.1.log_likelihood.total_cmp(&b.1.log_likelihood))
        }
    }

    sorted
        .into_iter()
        .filter(|(term, _)| pos.is_none_or(|p| p.keeps(term)))
        .take(top_n)
        .collect()
}

/// Both sides' top-N merged into one result set.
pub fn top_terms(results: &ResultSet, top_n: usize, pos: Option<PosSelection<'_>>) -> ResultSet {
    [Side::Corpus1, Side::Corpus2]
        .into_iter()
        .flat_map(|side| rank(results, top_n, side, pos))
        .map(|(term, stat)| (term.to_string(), stat.clone()))
        .collect()
}
