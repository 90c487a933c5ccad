//! Integration tests for `dunning_analysis`.
//
// This suite verifies:
// - Library pipeline (compare -> rank -> render) on small hand-checked tables
// - Documented compatibility conventions (sign rule, corpus-1-only traversal)
// - Caching through the recipes and the CLI
// - CLI behavior including part-of-speech filters and export formats
//
// Notes:
// - CLI tests run the binary with a per-process working directory (no global CWD change).
// - Tests that change the global CWD are marked #[serial].

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::prelude::*;
use assert_fs::prelude::*;
use predicates::prelude::*;
use regex::Regex;
use serde_json::Value as Json;
use serial_test::serial;
use tempfile::tempdir;

use dunning_analysis::{
    CompareOptions, DirCache, ExportFormat, FrequencyTable, LexiconTagger, PosCategory, PosFilter,
    PosSelection, PresentationConfig, ResultCache, ResultSet, Side, compare, compare_cached,
    export_results, rank, render,
};

// --------------------- helpers ---------------------

/// Create a file with content in a temp dir.
fn write_file(dir: &assert_fs::TempDir, name: &str, content: &str) -> PathBuf {
    let f = dir.child(name);
    f.write_str(content).unwrap();
    f.path().to_path_buf()
}

fn table(pairs: &[(&str, u64)]) -> FrequencyTable {
    pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

/// The two tables used throughout: "she" favours corpus 1, "he" corpus 2.
fn he_she() -> (FrequencyTable, FrequencyTable) {
    (
        table(&[("he", 1), ("she", 10), ("and", 10)]),
        table(&[("he", 10), ("she", 1), ("and", 10)]),
    )
}

/// A larger result set mixing parts of speech.
fn mixed_results() -> ResultSet {
    let t1 = table(&[
        ("laughed", 60),
        ("beautiful", 50),
        ("quickly", 40),
        ("table", 30),
        ("walked", 25),
        ("the", 200),
        ("frowned", 5),
        ("furious", 4),
    ]);
    let t2 = table(&[
        ("laughed", 10),
        ("beautiful", 12),
        ("quickly", 15),
        ("table", 20),
        ("walked", 22),
        ("the", 200),
        ("frowned", 45),
        ("furious", 40),
    ]);
    compare(&t1, &t2, &CompareOptions::default()).unwrap()
}

fn terms(ranked: &[(&str, &dunning_analysis::TermStatistic)]) -> Vec<String> {
    ranked.iter().map(|(t, _)| t.to_string()).collect()
}

/// Run CLI successfully with a specific working directory.
fn run_cli_ok_in(dir: &Path, args: &[&str]) -> assert_cmd::assert::Assert {
    let mut cmd = assert_cmd::Command::cargo_bin("dunning_analysis").unwrap();
    cmd.current_dir(dir);
    cmd.args(args).assert().success()
}

/// Run CLI expecting failure with a specific working directory.
fn run_cli_fail_in(dir: &Path, args: &[&str]) -> assert_cmd::assert::Assert {
    let mut cmd = assert_cmd::Command::cargo_bin("dunning_analysis").unwrap();
    cmd.current_dir(dir);
    cmd.args(args).assert().failure()
}

/// Find an export in `dir` whose name matches `<stem>_<YYYYMMDD>_<HHMMSS>_dunning.<ext>`.
fn find_export(dir: &Path, ext: &str) -> PathBuf {
    let re = Regex::new(&format!(r".+_\d{{8}}_\d{{6}}_dunning\.{ext}$")).unwrap();
    for entry in fs::read_dir(dir).unwrap().filter_map(|e| e.ok()) {
        let name = entry.file_name().to_string_lossy().into_owned();
        if re.is_match(&name) {
            return entry.path();
        }
    }
    panic!("No *_dunning.{ext} export found in {}", dir.display());
}

/// Two CSV frequency tables in `dir`, matching `he_she()`.
fn write_he_she_tables(dir: &assert_fs::TempDir) -> (PathBuf, PathBuf) {
    (
        write_file(dir, "female.csv", "term,count\nhe,1\nshe,10\nand,10\n"),
        write_file(dir, "male.csv", "term,count\nhe,10\nshe,1\nand,10\n"),
    )
}

// --------------------- library tests ---------------------

#[test]
fn lib_he_she_scores() {
    let (t1, t2) = he_she();
    let results = compare(&t1, &t2, &CompareOptions::default()).unwrap();

    let he = &results["he"];
    assert_eq!((he.count_total, he.count_1, he.count_2), (11, 1, 10));
    assert!((he.freq_1 - 1.0 / 21.0).abs() < 1e-12);
    assert!((he.freq_2 - 10.0 / 21.0).abs() < 1e-12);
    assert!((he.log_likelihood - -8.5472).abs() < 1e-4);
    assert!((results["she"].log_likelihood - 8.5472).abs() < 1e-4);
}

// Only terms of corpus 1 that also occur in corpus 2 are scored, and swapping the corpora flips
// the sign. Kept so results stay comparable with earlier runs.
#[test]
fn lib_only_shared_terms_are_scored() {
    let t1 = table(&[("shared", 12), ("only_one", 40)]);
    let t2 = table(&[("shared", 3), ("only_two", 40), ("sparse", 9)]);
    let results = compare(&t1, &t2, &CompareOptions::default()).unwrap();
    assert_eq!(results.keys().collect::<Vec<_>>(), ["shared"]);

    let swapped = compare(&t2, &t1, &CompareOptions::default()).unwrap();
    let forward = results["shared"].log_likelihood;
    let backward = swapped["shared"].log_likelihood;
    assert!((forward + backward).abs() < 1e-9);
    assert!(forward > 0.0, "shared is relatively more common in corpus 1");
}

#[test]
fn lib_threshold_is_configurable() {
    let t1 = table(&[("rare", 5), ("common", 50)]);
    let t2 = table(&[("rare", 4), ("common", 50)]);
    assert!(!compare(&t1, &t2, &CompareOptions::default()).unwrap().contains_key("rare"));
    let loose = CompareOptions {
        min_combined_count: 2,
    };
    assert!(compare(&t1, &t2, &loose).unwrap().contains_key("rare"));
}

#[test]
fn lib_rank_returns_sorted_bounded_views() {
    let results = mixed_results();
    let first = rank(&results, 3, Side::Corpus1, None);
    assert_eq!(first.len(), 3);
    assert!(
        first
            .windows(2)
            .all(|w| w[0].1.log_likelihood >= w[1].1.log_likelihood)
    );
    let second = rank(&results, 3, Side::Corpus2, None);
    assert!(
        second
            .windows(2)
            .all(|w| w[0].1.log_likelihood <= w[1].1.log_likelihood)
    );
    assert_eq!(second[0].0, "frowned");
    assert_eq!(rank(&results, 50, Side::Corpus1, None).len(), results.len());
}

#[test]
fn lib_category_filter_removes_terms_without_reordering_others() {
    let results = mixed_results();
    let tagger = LexiconTagger::new();
    let unfiltered = terms(&rank(&results, results.len(), Side::Corpus1, None));

    let verbs = PosFilter::Category(PosCategory::Verbs);
    let sel = PosSelection {
        filter: &verbs,
        tagger: &tagger,
    };
    let filtered = terms(&rank(&results, results.len(), Side::Corpus1, Some(sel)));
    assert!(filtered.iter().all(|t| ["laughed", "walked", "frowned"].contains(&t.as_str())));
    assert!(!filtered.contains(&"beautiful".to_string()));

    // Same relative order as the unfiltered ranking.
    let expected: Vec<String> = unfiltered
        .into_iter()
        .filter(|t| filtered.contains(t))
        .collect();
    assert_eq!(filtered, expected);
}

#[test]
fn lib_rendered_report_lists_ranked_terms_in_order() {
    let results = mixed_results();
    let config = PresentationConfig {
        top_n: 4,
        ..PresentationConfig::default()
    }
    .with_labels("Fem Author", "Male Author");
    let tagger = LexiconTagger::new();
    let report = render(&results, &config, &tagger);

    let (first, second) = report
        .split_once("Dunning Log-Likelihood results for Male Author")
        .expect("second table present");
    for (section, side) in [(first, Side::Corpus1), (second, Side::Corpus2)] {
        let ranked = terms(&rank(&results, 4, side, None));
        let shown: Vec<String> = section
            .lines()
            .filter(|l| l.starts_with("|  "))
            .map(|l| l[3..].split('|').next().unwrap().trim().to_string())
            .collect();
        assert_eq!(shown, ranked);
    }
}

#[test]
fn lib_adjective_report_drops_non_adjectives() {
    let results = mixed_results();
    let config = PresentationConfig {
        top_n: 2,
        filter: Some(PosFilter::Category(PosCategory::Adjectives)),
        ..PresentationConfig::default()
    };
    let report = render(&results, &config, &LexiconTagger::new());
    assert!(report.contains("Displaying Part of Speech: adjectives"));
    assert!(report.contains("|  beautiful "));
    assert!(report.contains("|  furious "));
    assert!(!report.contains("|  laughed "));
}

#[test]
fn lib_cache_round_trip_through_compare_cached() {
    let dir = tempdir().unwrap();
    let cache = DirCache::new(dir.path());
    let (t1, t2) = he_she();
    let fresh = compare_cached(&t1, &t2, &CompareOptions::default(), &cache, "he_she", true)
        .unwrap();
    let stored = cache.load("he_she").unwrap().found().expect("entry written");
    // Scores such as -8.547243830635558 come back bit for bit.
    assert_eq!(stored, fresh);
}

#[test]
fn lib_json_export_is_sorted_by_score() {
    let dir = tempdir().unwrap();
    let results = mixed_results();
    let path = export_results(
        &results,
        ExportFormat::Json,
        &PresentationConfig::default(),
        &LexiconTagger::new(),
        dir.path(),
        "mixed",
    )
    .unwrap();
    let v: Json = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
    let scores: Vec<f64> = v
        .as_array()
        .expect("json array")
        .iter()
        .map(|o| o["log_likelihood"].as_f64().unwrap())
        .collect();
    assert_eq!(scores.len(), results.len());
    assert!(scores.windows(2).all(|w| w[0] >= w[1]));
}

#[test]
#[serial]
fn lib_export_to_relative_directory() {
    let td = assert_fs::TempDir::new().unwrap();
    std::env::set_current_dir(td.path()).unwrap();
    let (t1, t2) = he_she();
    let results = compare(&t1, &t2, &CompareOptions::default()).unwrap();
    export_results(
        &results,
        ExportFormat::Tsv,
        &PresentationConfig::default(),
        &LexiconTagger::new(),
        Path::new("out"),
        "he_she",
    )
    .unwrap();
    let tsv = find_export(&td.path().join("out"), "tsv");
    let content = fs::read_to_string(tsv).unwrap();
    assert!(content.starts_with("term\tlog_likelihood\t"));
    assert!(content.lines().nth(1).unwrap().starts_with("she\t"));
}

#[test]
fn csv_export_neutralizes_formula_terms() {
    let dir = tempdir().unwrap();
    let t1 = table(&[(r#"=HYPERLINK("http://x")"#, 12), ("@cmd", 3), ("plain", 20)]);
    let t2 = table(&[(r#"=HYPERLINK("http://x")"#, 2), ("@cmd", 9), ("plain", 20)]);
    let results = compare(&t1, &t2, &CompareOptions::default()).unwrap();
    let path = export_results(
        &results,
        ExportFormat::Csv,
        &PresentationConfig::default(),
        &LexiconTagger::new(),
        dir.path(),
        "formulas",
    )
    .unwrap();
    let out = fs::read_to_string(path).unwrap();

    // Leading '=' / '@' get a quote prefix; inner quotes are doubled per CSV rules.
    assert!(out.contains(r#""'=HYPERLINK(""http://x"")""#), "{out}");
    assert!(out.contains("'@cmd,"));
    assert!(out.contains("\nplain,"));
}

// --------------------- CLI tests ---------------------

#[test]
fn cli_nonexistent_path_fails() {
    let td = tempdir().unwrap();
    let bad = td.path().join("does_not_exist.csv");
    run_cli_fail_in(
        td.path(),
        &[bad.to_string_lossy().as_ref(), bad.to_string_lossy().as_ref()],
    );
}

#[test]
fn cli_tables_print_both_sides() {
    let td = assert_fs::TempDir::new().unwrap();
    let (f, m) = write_he_she_tables(&td);
    run_cli_ok_in(
        td.path(),
        &[
            f.to_str().unwrap(),
            m.to_str().unwrap(),
            "--label-1",
            "Fem Author",
            "--label-2",
            "Male Author",
        ],
    )
    .stdout(predicate::str::contains(
        "Dunning Log-Likelihood results for Fem Author",
    ))
    .stdout(predicate::str::contains("count Male Author"))
    .stdout(predicate::str::contains("8.55"))
    .stdout(predicate::str::contains("-8.55"));
}

#[test]
fn cli_unknown_pos_filter_fails() {
    let td = assert_fs::TempDir::new().unwrap();
    let (f, m) = write_json_tables(&td);
    run_cli_fail_in(
        td.path(),
        &[f.to_str().unwrap(), m.to_str().unwrap(), "--pos", "nouns"],
    );
}

/// JSON frequency tables with the same counts as `he_she()`.
fn write_json_tables(dir: &assert_fs::TempDir) -> (PathBuf, PathBuf) {
    (
        write_file(dir, "a.json", r#"{"he": 1, "she": 10, "and": 10}"#),
        write_file(dir, "b.json", r#"{"he": 10, "she": 1, "and": 10}"#),
    )
}

#[test]
fn cli_pos_filter_with_lexicon() {
    let td = assert_fs::TempDir::new().unwrap();
    let (f, m) = write_he_she_tables(&td);
    let lexicon = write_file(&td, "lexicon.tsv", "term\ttag\nand\tRB\n");
    run_cli_ok_in(
        td.path(),
        &[
            f.to_str().unwrap(),
            m.to_str().unwrap(),
            "--pos",
            "adverbs",
            "--lexicon",
            lexicon.to_str().unwrap(),
        ],
    )
    .stdout(predicate::str::contains("Displaying Part of Speech: adverbs"))
    .stdout(predicate::str::contains("|  and "))
    .stdout(predicate::str::contains("|  she ").not());
}

#[test]
fn cli_all_groups_prints_every_category() {
    let td = assert_fs::TempDir::new().unwrap();
    let (f, m) = write_he_she_tables(&td);
    let assert = run_cli_ok_in(
        td.path(),
        &[f.to_str().unwrap(), m.to_str().unwrap(), "--all-groups"],
    );
    let out = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    for name in ["all", "verbs", "adjectives", "pronouns", "adverbs"] {
        assert!(out.contains(&format!("Displaying Part of Speech: {name}")));
    }
}

#[test]
fn cli_associated_words_from_documents() {
    let td = assert_fs::TempDir::new().unwrap();
    td.child("she_books").create_dir_all().unwrap();
    td.child("he_books").create_dir_all().unwrap();
    write_file(
        &td,
        "she_books/one.txt",
        &"She laughed. She wept. ".repeat(6),
    );
    write_file(
        &td,
        "he_books/one.txt",
        &"He laughed. He wept. He wept. ".repeat(4),
    );

    run_cli_ok_in(
        td.path(),
        &[
            "she_books",
            "he_books",
            "--associated",
            "she,he",
            "--min-count",
            "5",
        ],
    )
    .stdout(predicate::str::contains("|  laughed "))
    .stdout(predicate::str::contains("|  wept "));
}

#[test]
fn cli_export_csv_and_json() {
    let td = assert_fs::TempDir::new().unwrap();
    let (f, m) = write_he_she_tables(&td);
    let out_dir = td.path().join("exports");
    for fmt in ["csv", "json"] {
        run_cli_ok_in(
            td.path(),
            &[
                f.to_str().unwrap(),
                m.to_str().unwrap(),
                "--export-format",
                fmt,
                "--output",
                out_dir.to_str().unwrap(),
            ],
        )
        .stdout(predicate::str::contains("Results written to"));
    }
    let csv = fs::read_to_string(find_export(&out_dir, "csv")).unwrap();
    let mut lines = csv.lines();
    assert_eq!(
        lines.next().unwrap(),
        "term,log_likelihood,count_total,count_1,count_2,freq_total,freq_1,freq_2"
    );
    assert!(lines.next().unwrap().starts_with("she,"));

    let json_text = fs::read_to_string(find_export(&out_dir, "json")).unwrap();
    let json: Json = serde_json::from_str(&json_text).unwrap();
    assert_eq!(json.as_array().unwrap().len(), 3);
}

#[test]
fn cli_store_then_reuse_cache() {
    let td = assert_fs::TempDir::new().unwrap();
    let (f, m) = write_he_she_tables(&td);
    let cache_dir = td.path().join("cache");
    run_cli_ok_in(
        td.path(),
        &[
            f.to_str().unwrap(),
            m.to_str().unwrap(),
            "--cache-dir",
            cache_dir.to_str().unwrap(),
            "--store",
        ],
    );
    let entry = cache_dir.join("dunning_female_vs_male.json");
    assert!(entry.exists(), "expected cache entry {}", entry.display());

    // The cached entry is used even though the inputs are now empty.
    fs::write(&f, "term,count\n").unwrap();
    run_cli_ok_in(
        td.path(),
        &[
            f.to_str().unwrap(),
            m.to_str().unwrap(),
            "--cache-dir",
            cache_dir.to_str().unwrap(),
        ],
    )
    .stdout(predicate::str::contains("|  she "));

    // Without the cache the empty table is rejected.
    run_cli_fail_in(td.path(), &[f.to_str().unwrap(), m.to_str().unwrap()]);
}
