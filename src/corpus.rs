//! Documents, partitions and the frequency tables built from them.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use log::{debug, warn};
use serde_json::Value as Json;

use crate::FrequencyTable;
use crate::error::{DunningError, Result};
use crate::source::{TextSource, collect_files};

/// Lowercase `content` and split it into words.
///
/// Words are runs of alphanumeric characters, with apostrophes kept inside words. A trailing
/// possessive `'s` is dropped.
///
/// ```
/// use dunning_analysis::trim_to_words;
/// let words = trim_to_words("(_Test] {test2!= She's \"don't\"");
/// assert_eq!(words, vec!["test", "test2", "she", "don't"]);
/// ```
pub fn trim_to_words(content: &str) -> Vec<String> {
    content
        .to_lowercase()
        .replace('’', "'")
        .split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .map(|w| w.trim_matches('\''))
        .map(|w| w.strip_suffix("'s").unwrap_or(w))
        .filter(|w| !w.is_empty())
        .map(String::from)
        .collect()
}

/// Occurrences of each word.
pub fn count_words<S: AsRef<str>>(words: &[S]) -> FrequencyTable {
    let mut frequency = FrequencyTable::new();
    for word in words {
        *frequency.entry(word.as_ref().to_owned()).or_insert(0) += 1;
    }
    frequency
}

fn merge_into(total: &mut FrequencyTable, part: FrequencyTable) {
    for (word, count) in part {
        *total.entry(word).or_insert(0) += count;
    }
}

/// One tokenised text plus its metadata (e.g. `author_gender`).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    pub name: String,
    pub metadata: BTreeMap<String, String>,
    pub words: Vec<String>,
}

impl Document {
    pub fn from_text(name: impl Into<String>, text: &str) -> Self {
        Self {
            name: name.into(),
            metadata: BTreeMap::new(),
            words: trim_to_words(text),
        }
    }

    pub fn with_metadata(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(field.into(), value.into());
        self
    }

    pub fn word_counts(&self) -> FrequencyTable {
        count_words(&self.words)
    }

    /// Counts of the word directly following each occurrence of `target`.
    pub fn words_associated(&self, target: &str) -> FrequencyTable {
        let target = target.to_lowercase();
        let mut counts = FrequencyTable::new();
        for pair in self.words.windows(2) {
            if pair[0] == target {
                *counts.entry(pair[1].clone()).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Counts of the words within `window` positions of any occurrence of one of `targets`.
    /// The occurrence itself is not counted.
    pub fn word_window_counts<S: AsRef<str>>(
        &self,
        targets: &[S],
        window: usize,
    ) -> FrequencyTable {
        let targets: BTreeSet<String> = targets.iter().map(|t| t.as_ref().to_lowercase()).collect();
        let mut counts = FrequencyTable::new();
        for (index, word) in self.words.iter().enumerate() {
            if !targets.contains(word) {
                continue;
            }
            let min = index.saturating_sub(window);
            let max = (index + window + 1).min(self.words.len());
            for (position, near) in self.words.iter().enumerate().take(max).skip(min) {
                if position != index {
                    *counts.entry(near.clone()).or_insert(0) += 1;
                }
            }
        }
        counts
    }
}

/// A named collection of documents.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Corpus {
    pub name: String,
    pub documents: Vec<Document>,
    /// Files that were found but could not be read, with the reason.
    pub failed_files: Vec<(String, String)>,
}

impl Corpus {
    pub fn new(name: impl Into<String>, documents: Vec<Document>) -> Self {
        Self {
            name: name.into(),
            documents,
            failed_files: Vec::new(),
        }
    }

    /// Read every supported document under `path`.
    ///
    /// `metadata` is a delimited file with a header row whose `filename` column names a
    /// document by file name; every other column becomes a metadata field. Unreadable documents
    /// are skipped and listed in `failed_files`.
    pub fn from_path(
        source: &dyn TextSource,
        name: impl Into<String>,
        path: &Path,
        metadata: Option<&Path>,
    ) -> Result<Self> {
        let by_file = match metadata {
            Some(meta) => read_metadata(source, meta)?,
            None => BTreeMap::new(),
        };

        let mut corpus = Corpus::new(name, Vec::new());
        for file in collect_files(path) {
            let file_name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            match source.read_text(&file) {
                Ok(text) => {
                    let mut doc = Document::from_text(file_name.clone(), &text);
                    if let Some(fields) = by_file.get(&file_name) {
                        doc.metadata = fields.clone();
                    }
                    corpus.documents.push(doc);
                }
                Err(e) => {
                    warn!("skipping {}: {e}", file.display());
                    corpus
                        .failed_files
                        .push((file.display().to_string(), e.to_string()));
                }
            }
        }
        debug!(
            "corpus '{}': {} documents, {} failed",
            corpus.name,
            corpus.documents.len(),
            corpus.failed_files.len()
        );
        Ok(corpus)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Metadata fields present on at least one document.
    pub fn metadata_fields(&self) -> BTreeSet<&str> {
        self.documents
            .iter()
            .flat_map(|d| d.metadata.keys().map(String::as_str))
            .collect()
    }

    /// The sub-corpus of documents whose `field` equals `value` (case-insensitive).
    ///
    /// Fails if no document carries `field` at all.
    pub fn filter_by(&self, field: &str, value: &str) -> Result<Corpus> {
        if !self.metadata_fields().contains(field) {
            return Err(DunningError::MissingMetadata {
                corpus: self.name.clone(),
                field: field.to_string(),
            });
        }
        let documents = self
            .documents
            .iter()
            .filter(|d| {
                d.metadata
                    .get(field)
                    .is_some_and(|v| v.eq_ignore_ascii_case(value))
            })
            .cloned()
            .collect();
        Ok(Corpus::new(format!("{}_{value}", self.name), documents))
    }

    pub fn word_counts(&self) -> FrequencyTable {
        let mut total = FrequencyTable::new();
        for doc in &self.documents {
            merge_into(&mut total, doc.word_counts());
        }
        total
    }

    pub fn words_associated(&self, target: &str) -> FrequencyTable {
        let mut total = FrequencyTable::new();
        for doc in &self.documents {
            merge_into(&mut total, doc.words_associated(target));
        }
        total
    }

    /// Words following any of `targets` or, with `window`, words within `window` positions of
    /// them.
    pub fn association_counts<S: AsRef<str>>(
        &self,
        targets: &[S],
        window: Option<usize>,
    ) -> FrequencyTable {
        if let Some(w) = window {
            return self.word_window_counts(targets, w);
        }
        let mut total = FrequencyTable::new();
        for target in targets {
            merge_into(&mut total, self.words_associated(target.as_ref()));
        }
        total
    }

    pub fn word_window_counts<S: AsRef<str>>(
        &self,
        targets: &[S],
        window: usize,
    ) -> FrequencyTable {
        let mut total = FrequencyTable::new();
        for doc in &self.documents {
            merge_into(&mut total, doc.word_window_counts(targets, window));
        }
        total
    }
}

fn read_metadata(
    source: &dyn TextSource,
    path: &Path,
) -> Result<BTreeMap<String, BTreeMap<String, String>>> {
    let rows = source.read_rows(path)?;
    let mut rows = rows.into_iter();
    let header = rows
        .next()
        .ok_or_else(|| DunningError::invalid_table(path, "metadata file is empty"))?;
    let key_col = header
        .iter()
        .position(|h| h.trim() == "filename")
        .ok_or_else(|| DunningError::invalid_table(path, "no 'filename' column"))?;

    let mut by_file = BTreeMap::new();
    for row in rows {
        let Some(file_name) = row.get(key_col) else {
            continue;
        };
        let fields = header
            .iter()
            .zip(&row)
            .enumerate()
            .filter(|(i, _)| *i != key_col)
            .map(|(_, (h, v))| (h.trim().to_string(), v.trim().to_string()))
            .collect();
        by_file.insert(file_name.trim().to_string(), fields);
    }
    Ok(by_file)
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default()
}

/// Build a frequency table from `path`.
///
/// - `.csv` / `.tsv`: `term,count` rows, header optional.
/// - `.json`: `{"term": count, ...}` or `[{"item": term, "count": n}, ...]`.
/// - any other file or a directory: documents are tokenised and counted.
pub fn load_frequency_table(source: &dyn TextSource, path: &Path) -> Result<FrequencyTable> {
    if path.is_dir() {
        let corpus = Corpus::from_path(source, "", path, None)?;
        return Ok(corpus.word_counts());
    }
    match extension(path).as_str() {
        "csv" | "tsv" => table_from_rows(path, source.read_rows(path)?),
        "json" => table_from_json(path, serde_json::from_slice(&source.read_bytes(path)?)?),
        _ => Ok(count_words(&trim_to_words(&source.read_text(path)?))),
    }
}

fn table_from_rows(path: &Path, rows: Vec<Vec<String>>) -> Result<FrequencyTable> {
    let mut table = FrequencyTable::new();
    for (line, row) in rows.into_iter().enumerate() {
        let [term, count, ..] = row.as_slice() else {
            return Err(DunningError::invalid_table(
                path,
                format!("row {} needs a term and a count", line + 1),
            ));
        };
        match count.trim().parse::<u64>() {
            Ok(n) => *table.entry(term.trim().to_string()).or_insert(0) += n,
            // Header row.
            Err(_) if line == 0 => continue,
            Err(e) => {
                return Err(DunningError::invalid_table(
                    path,
                    format!("row {}: {e}", line + 1),
                ));
            }
        }
    }
    Ok(table)
}

fn table_from_json(path: &Path, value: Json) -> Result<FrequencyTable> {
    let bad = |what: &str| DunningError::invalid_table(path, what);
    let mut table = FrequencyTable::new();
    match value {
        Json::Object(map) => {
            for (term, count) in map {
                let n = count.as_u64().ok_or_else(|| bad("counts must be non-negative integers"))?;
                table.insert(term, n);
            }
        }
        Json::Array(items) => {
            for item in items {
                let term = ["item", "term", "word"]
                    .iter()
                    .find_map(|k| item.get(k).and_then(Json::as_str))
                    .ok_or_else(|| bad("array entries need an 'item' string"))?;
                let n = item
                    .get("count")
                    .and_then(Json::as_u64)
                    .ok_or_else(|| bad("array entries need an integer 'count'"))?;
                *table.entry(term.to_string()).or_insert(0) += n;
            }
        }
        _ => return Err(bad("expected an object or an array")),
    }
    Ok(table)
}
