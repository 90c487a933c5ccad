//! Fixed-width tables of the most distinctive terms, and file export of result sets.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::prelude::*;
use clap::ValueEnum;
use log::info;

use crate::compare::{ResultSet, TermStatistic};
use crate::error::Result;
use crate::rank::{PosCategory, PosFilter, PosSelection, Side, rank};
use crate::tagger::Tagger;

/// What to show and how to label it.
#[derive(Debug, Clone, PartialEq)]
pub struct PresentationConfig {
    /// Rows per table.
    pub top_n: usize,
    pub label_1: String,
    pub label_2: String,
    pub filter: Option<PosFilter>,
}

impl Default for PresentationConfig {
    fn default() -> Self {
        Self {
            top_n: 10,
            label_1: "Corpus 1".to_string(),
            label_2: "Corpus 2".to_string(),
            filter: None,
        }
    }
}

impl PresentationConfig {
    pub fn with_labels(mut self, label_1: impl Into<String>, label_2: impl Into<String>) -> Self {
        self.label_1 = label_1.into();
        self.label_2 = label_2.into();
        self
    }
}

const RULE_WIDTH: usize = 8 * 21;

fn headings(config: &PresentationConfig) -> [String; 8] {
    [
        "term".to_string(),
        "dunning".to_string(),
        "count_total".to_string(),
        format!("count {}", config.label_1),
        format!("count {}", config.label_2),
        "freq_total".to_string(),
        format!("freq {}", config.label_1),
        format!("freq {}", config.label_2),
    ]
}

fn write_row(out: &mut String, term: &str, stat: &TermStatistic) {
    out.push_str(&format!("|  {term:<18}|"));
    out.push_str(&format!("  {:>17.2} |", stat.log_likelihood));
    for count in [stat.count_total, stat.count_1, stat.count_2] {
        out.push_str(&format!("  {count:>17} |"));
    }
    for freq in [stat.freq_total, stat.freq_1, stat.freq_2] {
        out.push_str(&format!("  {:>16.4}% |", freq * 100.0));
    }
    out.push('\n');
}

/// Two tables, the terms most distinctive of corpus 1 followed by those of corpus 2.
///
/// `tagger` is only consulted when `config.filter` is set.
pub fn render(results: &ResultSet, config: &PresentationConfig, tagger: &dyn Tagger) -> String {
    let filter_name = config
        .filter
        .as_ref()
        .map(|f| f.to_string())
        .unwrap_or_else(|| "all".to_string());
    let mut out = format!("\nDisplaying Part of Speech: {filter_name}\n");

    let pos = config
        .filter
        .as_ref()
        .map(|filter| PosSelection { filter, tagger });
    let heads = headings(config);

    for (side, label) in [
        (Side::Corpus1, &config.label_1),
        (Side::Corpus2, &config.label_2),
    ] {
        out.push_str(&format!("\nDunning Log-Likelihood results for {label}\n|"));
        for heading in &heads {
            out.push_str(&format!(" {heading:<19}|"));
        }
        out.push('\n');
        out.push_str(&"_".repeat(RULE_WIDTH));
        out.push('\n');

        for (term, stat) in rank(results, config.top_n, side, pos) {
            write_row(&mut out, term, stat);
        }
    }
    out
}

/// The unfiltered tables followed by one pair per named category.
pub fn render_groups(
    results: &ResultSet,
    config: &PresentationConfig,
    tagger: &dyn Tagger,
) -> String {
    std::iter::once(None)
        .chain(PosCategory::ALL.into_iter().map(|c| Some(PosFilter::Category(c))))
        .map(|filter| {
            let view = PresentationConfig {
                filter,
                ..config.clone()
            };
            render(results, &view, tagger)
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Txt,
    Csv,
    Tsv,
    Json,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Txt => "txt",
            ExportFormat::Csv => "csv",
            ExportFormat::Tsv => "tsv",
            ExportFormat::Json => "json",
        }
    }
}

/// Prefix cells that a spreadsheet would evaluate as a formula with `'`.
pub fn csv_safe_cell(cell: String) -> String {
    match cell.chars().next() {
        Some('=' | '+' | '-' | '@' | '\t' | '\r') => format!("'{cell}"),
        _ => cell,
    }
}

/// Every scored term, most positive first.
fn by_score(results: &ResultSet) -> Vec<&TermStatistic> {
    let mut all: Vec<&TermStatistic> = results.values().collect();
    all.sort_by(|a, b| b.log_likelihood.total_cmp(&a.log_likelihood));
    all
}

fn write_delimited(path: &Path, results: &ResultSet, delimiter: u8) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_path(path)?;
    wtr.write_record([
        "term",
        "log_likelihood",
        "count_total",
        "count_1",
        "count_2",
        "freq_total",
        "freq_1",
        "freq_2",
    ])?;
    for stat in by_score(results) {
        wtr.write_record([
            csv_safe_cell(stat.term.clone()),
            stat.log_likelihood.to_string(),
            stat.count_total.to_string(),
            stat.count_1.to_string(),
            stat.count_2.to_string(),
            stat.freq_total.to_string(),
            stat.freq_1.to_string(),
            stat.freq_2.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write `results` into `dir` as `<stem>_<YYYYMMDD_HHMMSS>_dunning.<ext>`.
///
/// `Txt` writes the rendered report (`config` and `tagger` apply); the tabular formats write every
/// scored term ordered by score.
pub fn export_results(
    results: &ResultSet,
    format: ExportFormat,
    config: &PresentationConfig,
    tagger: &dyn Tagger,
    dir: &Path,
    stem: &str,
) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let stamp = Local::now().format("%Y%m%d_%H%M%S");
    let path = dir.join(format!("{stem}_{stamp}_dunning.{}", format.extension()));

    match format {
        ExportFormat::Txt => {
            let mut file = BufWriter::new(File::create(&path)?);
            file.write_all(render(results, config, tagger).as_bytes())?;
            file.flush()?;
        }
        ExportFormat::Csv => write_delimited(&path, results, b',')?,
        ExportFormat::Tsv => write_delimited(&path, results, b'\t')?,
        ExportFormat::Json => {
            let mut file = BufWriter::new(File::create(&path)?);
            serde_json::to_writer_pretty(&mut file, &by_score(results))?;
            file.flush()?;
        }
    }
    info!("exported {} terms to {}", results.len(), path.display());
    Ok(path)
}
