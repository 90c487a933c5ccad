//! File access for corpora, frequency tables and lexicons.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{DunningError, Result};
use crate::office::{extract_text_from_docx, extract_text_from_odt};

/// What the rest of the crate needs from the file system: a document's text, a file's bytes, or
/// the rows of a delimited file.
pub trait TextSource {
    fn read_text(&self, path: &Path) -> Result<String>;
    /// The file's contents as stored, e.g. a JSON table.
    fn read_bytes(&self, path: &Path) -> Result<Vec<u8>>;
    /// Raw records, header row included if the file has one.
    fn read_rows(&self, path: &Path) -> Result<Vec<Vec<String>>>;
}

/// Local file system, dispatching on file extension.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsSource;

/// Extensions [`FsSource::read_text`] can extract text from.
pub const TEXT_EXTENSIONS: &[&str] = &["txt", "md", "pdf", "docx", "odt"];

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default()
}

impl TextSource for FsSource {
    fn read_text(&self, path: &Path) -> Result<String> {
        match extension(path).as_str() {
            "txt" | "md" => {
                let bytes = self.read_bytes(path)?;
                // Mis-encoded bytes should not stop a whole corpus from loading.
                Ok(String::from_utf8_lossy(&bytes).into_owned())
            }
            "pdf" => pdf_extract::extract_text(path).map_err(|e| DunningError::document(path, e)),
            "docx" => extract_text_from_docx(path),
            "odt" => extract_text_from_odt(path),
            _ => Err(DunningError::UnsupportedFileType(path.to_path_buf())),
        }
    }

    fn read_bytes(&self, path: &Path) -> Result<Vec<u8>> {
        Ok(fs::read(path)?)
    }

    fn read_rows(&self, path: &Path) -> Result<Vec<Vec<String>>> {
        let delimiter = if extension(path) == "tsv" { b'\t' } else { b',' };
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(delimiter)
            .from_path(path)?;
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_string).collect());
        }
        Ok(rows)
    }
}

/// All readable documents under `path` (or `path` itself if it is a file), sorted.
pub fn collect_files(path: &Path) -> Vec<PathBuf> {
    if path.is_file() {
        return vec![path.to_path_buf()];
    }
    let mut files: Vec<PathBuf> = WalkDir::new(path)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| TEXT_EXTENSIONS.contains(&extension(p).as_str()))
        .collect();
    files.sort();
    files
}
