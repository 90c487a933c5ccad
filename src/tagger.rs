//! Part-of-speech tagging of bare terms.
//!
//! Ranking only needs one tag per term, so a [`Tagger`] sees each term in isolation, without the
//! sentence it came from. Ambiguous words ("run", "present") get whatever tag the tagger prefers
//! for the word on its own.

use std::collections::HashMap;
use std::path::Path;

use log::debug;

use crate::error::{DunningError, Result};
use crate::source::TextSource;

/// Penn Treebank tag inventory.
pub const PENN_TAGS: &[&str] = &[
    "CC", "CD", "DT", "EX", "FW", "IN", "JJ", "JJR", "JJS", "LS", "MD", "NN", "NNS", "NNP", "NNPS",
    "PDT", "POS", "PRP", "PRP$", "RB", "RBR", "RBS", "RP", "SYM", "TO", "UH", "VB", "VBD", "VBG",
    "VBN", "VBP", "VBZ", "WDT", "WP", "WP$", "WRB", "$", "#", "``", "''", "(", ")", ",", ".", ":",
];

pub fn is_penn_tag(tag: &str) -> bool {
    PENN_TAGS.contains(&tag)
}

/// Assigns a single grammatical tag to a bare term.
pub trait Tagger {
    fn tag(&self, term: &str) -> String;
}

impl<F> Tagger for F
where
    F: Fn(&str) -> String,
{
    fn tag(&self, term: &str) -> String {
        self(term)
    }
}

// Closed-class English words, where suffix rules are useless.
const BUILTIN: &[(&str, &str)] = &[
    ("i", "PRP"),
    ("you", "PRP"),
    ("he", "PRP"),
    ("she", "PRP"),
    ("it", "PRP"),
    ("we", "PRP"),
    ("they", "PRP"),
    ("me", "PRP"),
    ("him", "PRP"),
    ("us", "PRP"),
    ("them", "PRP"),
    ("himself", "PRP"),
    ("herself", "PRP"),
    ("itself", "PRP"),
    ("myself", "PRP"),
    ("yourself", "PRP"),
    ("themselves", "PRP"),
    ("my", "PRP$"),
    ("your", "PRP$"),
    ("his", "PRP$"),
    ("her", "PRP$"),
    ("its", "PRP$"),
    ("our", "PRP$"),
    ("their", "PRP$"),
    ("who", "WP"),
    ("whom", "WP"),
    ("what", "WP"),
    ("whose", "WP$"),
    ("which", "WDT"),
    ("how", "WRB"),
    ("when", "WRB"),
    ("where", "WRB"),
    ("why", "WRB"),
    ("the", "DT"),
    ("a", "DT"),
    ("an", "DT"),
    ("this", "DT"),
    ("that", "DT"),
    ("these", "DT"),
    ("those", "DT"),
    ("and", "CC"),
    ("or", "CC"),
    ("but", "CC"),
    ("nor", "CC"),
    ("of", "IN"),
    ("in", "IN"),
    ("on", "IN"),
    ("at", "IN"),
    ("by", "IN"),
    ("for", "IN"),
    ("with", "IN"),
    ("from", "IN"),
    ("into", "IN"),
    ("upon", "IN"),
    ("as", "IN"),
    ("if", "IN"),
    ("to", "TO"),
    ("there", "EX"),
    ("can", "MD"),
    ("could", "MD"),
    ("may", "MD"),
    ("might", "MD"),
    ("must", "MD"),
    ("shall", "MD"),
    ("should", "MD"),
    ("will", "MD"),
    ("would", "MD"),
    ("be", "VB"),
    ("is", "VBZ"),
    ("am", "VBP"),
    ("are", "VBP"),
    ("was", "VBD"),
    ("were", "VBD"),
    ("been", "VBN"),
    ("being", "VBG"),
    ("has", "VBZ"),
    ("have", "VBP"),
    ("had", "VBD"),
    ("does", "VBZ"),
    ("do", "VBP"),
    ("did", "VBD"),
    ("said", "VBD"),
    ("went", "VBD"),
    ("came", "VBD"),
    ("saw", "VBD"),
    ("felt", "VBD"),
    ("thought", "VBD"),
    ("knew", "VBD"),
    ("told", "VBD"),
    ("not", "RB"),
    ("very", "RB"),
    ("never", "RB"),
    ("always", "RB"),
    ("often", "RB"),
    ("also", "RB"),
    ("again", "RB"),
    ("still", "RB"),
    ("then", "RB"),
    ("now", "RB"),
    ("here", "RB"),
    ("more", "RBR"),
    ("less", "RBR"),
    ("most", "RBS"),
    ("good", "JJ"),
    ("bad", "JJ"),
    ("old", "JJ"),
    ("young", "JJ"),
    ("little", "JJ"),
    ("great", "JJ"),
    ("poor", "JJ"),
    ("rich", "JJ"),
    ("happy", "JJ"),
    ("better", "JJR"),
    ("worse", "JJR"),
    ("best", "JJS"),
    ("worst", "JJS"),
    ("oh", "UH"),
];

/// Lexicon lookup with suffix heuristics for unknown words.
///
/// Lookup order: user lexicon, built-in closed-class words, suffix rules, then `NN`.
#[derive(Debug, Clone)]
pub struct LexiconTagger {
    lexicon: HashMap<String, String>,
}

impl Default for LexiconTagger {
    fn default() -> Self {
        Self::new()
    }
}

impl LexiconTagger {
    /// Built-in words and suffix rules only.
    pub fn new() -> Self {
        Self {
            lexicon: HashMap::new(),
        }
    }

    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            lexicon: entries
                .into_iter()
                .map(|(k, v)| (k.into().to_lowercase(), v.into()))
                .collect(),
        }
    }

    /// Load `term,tag` rows (tab-separated for `.tsv`). Tags outside the Penn inventory are
    /// rejected so that a typo cannot silently empty a filter.
    pub fn from_path(source: &dyn TextSource, path: &Path) -> Result<Self> {
        let rows = source.read_rows(path)?;
        let mut lexicon = HashMap::with_capacity(rows.len());
        for (line, row) in rows.iter().enumerate() {
            let (term, tag) = match row.as_slice() {
                [term, tag, ..] => (term.trim(), tag.trim()),
                _ => {
                    return Err(DunningError::invalid_table(
                        path,
                        format!("row {} needs a term and a tag", line + 1),
                    ));
                }
            };
            if !is_penn_tag(tag) {
                // Tolerate a header row.
                if line == 0 {
                    continue;
                }
                return Err(DunningError::invalid_table(
                    path,
                    format!("row {}: unknown tag '{tag}'", line + 1),
                ));
            }
            lexicon.insert(term.to_lowercase(), tag.to_string());
        }
        debug!("loaded {} lexicon entries from {}", lexicon.len(), path.display());
        Ok(Self { lexicon })
    }

    pub fn len(&self) -> usize {
        self.lexicon.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lexicon.is_empty()
    }
}

impl Tagger for LexiconTagger {
    fn tag(&self, term: &str) -> String {
        let lower = term.to_lowercase();
        if let Some(tag) = self.lexicon.get(&lower) {
            return tag.clone();
        }
        if let Some((_, tag)) = BUILTIN.iter().find(|(w, _)| *w == lower) {
            return (*tag).to_string();
        }
        suffix_tag(&lower).to_string()
    }
}

fn suffix_tag(word: &str) -> &'static str {
    if word.is_empty() {
        return "NN";
    }
    if word.chars().all(|c| c.is_ascii_digit() || c == '.' || c == ',') {
        return "CD";
    }
    if !word.chars().any(char::is_alphanumeric) {
        return "SYM";
    }
    let rules: &[(&str, &str)] = &[
        ("ing", "VBG"),
        ("ed", "VBD"),
        ("ly", "RB"),
        ("ous", "JJ"),
        ("ful", "JJ"),
        ("less", "JJ"),
        ("able", "JJ"),
        ("ible", "JJ"),
        ("ive", "JJ"),
        ("ish", "JJ"),
        ("est", "JJS"),
        ("ness", "NN"),
        ("ment", "NN"),
        ("tion", "NN"),
        ("ize", "VB"),
        ("ise", "VB"),
        ("s", "NNS"),
    ];
    // Very short words ("red", "bed", "is") are too short for suffix rules.
    rules
        .iter()
        .find(|(suffix, _)| word.len() > suffix.len() + 2 && word.ends_with(suffix))
        .map(|(_, tag)| *tag)
        .unwrap_or("NN")
}
