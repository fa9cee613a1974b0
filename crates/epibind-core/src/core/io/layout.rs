use chrono::NaiveDate;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const LOG_FILE_NAME: &str = "app.log";
const LONG_SUFFIX: &str = "_RESULTS_LONG.csv";
const SHORT_SUFFIX: &str = "_RESULTS_SHORT.csv";
const UNSAFE_FILE_CHARS: [char; 9] = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Deterministic locations of every artifact produced by a run.
///
/// ```text
/// <output_base>/RESULTS-<stem>-<TAG>-<dd-mm-YYYY>/
///     app.log
///     results_long_<stem>/<id>_RESULTS_LONG.csv
///     results_short_<stem>/<id>_RESULTS_SHORT.csv
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    root: PathBuf,
    long_dir: PathBuf,
    short_dir: PathBuf,
    log_path: PathBuf,
}

impl OutputLayout {
    /// Builds the layout rooted directly at `root`, with `stem` naming the subdirectories.
    pub fn new(root: impl Into<PathBuf>, stem: &str) -> Self {
        let root = root.into();
        Self {
            long_dir: root.join(format!("results_long_{}", stem)),
            short_dir: root.join(format!("results_short_{}", stem)),
            log_path: root.join(LOG_FILE_NAME),
            root,
        }
    }

    /// Builds the dated layout for a run over `input_path`.
    ///
    /// `tag` is upper-cased into the root directory name (usually the species).
    pub fn for_run(output_base: &Path, input_path: &Path, tag: &str, date: NaiveDate) -> Self {
        let stem = input_stem(input_path);
        let root = output_base.join(format!(
            "RESULTS-{}-{}-{}",
            stem,
            file_key(&tag.to_uppercase()),
            date.format("%d-%m-%Y")
        ));
        Self::new(root, &stem)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn long_dir(&self) -> &Path {
        &self.long_dir
    }

    pub fn short_dir(&self) -> &Path {
        &self.short_dir
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    pub fn long_path(&self, record_id: &str) -> PathBuf {
        self.long_dir
            .join(format!("{}{}", file_key(record_id), LONG_SUFFIX))
    }

    pub fn short_path(&self, record_id: &str) -> PathBuf {
        self.short_dir
            .join(format!("{}{}", file_key(record_id), SHORT_SUFFIX))
    }

    /// Creates the root, long and short directories. Safe to call repeatedly.
    pub fn create_dirs(&self) -> io::Result<()> {
        for dir in [&self.root, &self.long_dir, &self.short_dir] {
            fs::create_dir_all(dir)?;
        }
        Ok(())
    }
}

/// The file-name stem used for a record's artifacts.
///
/// Characters that are path separators or reserved on common filesystems are
/// replaced by `_`, so a record can never write outside its directory.
pub fn file_key(record_id: &str) -> String {
    record_id
        .chars()
        .map(|c| {
            if UNSAFE_FILE_CHARS.contains(&c) || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect()
}

/// The input file name up to its first `.`.
pub fn input_stem(input_path: &Path) -> String {
    input_path
        .file_name()
        .map(|name| name.to_string_lossy())
        .and_then(|name| name.split('.').next().map(str::to_string))
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| "input".to_string())
}
