//! Batch Classification
//!
//! Classifies every record of a CSV or JSON Lines file. Each non-blank line
//! is one record; results are attributed back by 1-based line number.

use serde::Serialize;
use std::num::NonZeroUsize;
use std::path::Path;
use tracing::{debug, info};

use crate::error::BatchError;
use crate::parser::normalize_line_endings;
use crate::verdict::ClassificationOutcome;
use crate::ActivityClassifier;

const BOM: char = '\u{feff}';

/// Layout of a batch file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchFormat {
    /// One flat row per line, optionally after a header line
    Csv { has_header: bool },
    /// One JSON object per line
    JsonLines,
}

impl BatchFormat {
    /// `.json` and `.jsonl` files are JSON Lines, anything else is CSV
    pub fn infer(path: &Path, has_header: bool) -> Self {
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                ext.eq_ignore_ascii_case("json") || ext.eq_ignore_ascii_case("jsonl")
            });

        if is_json {
            BatchFormat::JsonLines
        } else {
            BatchFormat::Csv { has_header }
        }
    }

    fn skips_header(&self) -> bool {
        matches!(self, BatchFormat::Csv { has_header: true })
    }
}

/// Outcome for one line of a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchEntry {
    /// 1-based line number in the source file
    pub line_number: usize,
    #[serde(flatten)]
    pub outcome: ClassificationOutcome,
}

/// Per-file batch results
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub source: String,
    pub results: Vec<BatchEntry>,
    pub total_count: usize,
    pub malicious_count: usize,
    pub error_count: usize,
}

impl BatchReport {
    fn new(source: impl Into<String>, results: Vec<BatchEntry>) -> Self {
        let malicious_count = results.iter().filter(|e| e.outcome.is_malicious()).count();
        let error_count = results.iter().filter(|e| !e.outcome.success).count();

        Self {
            source: source.into(),
            total_count: results.len(),
            malicious_count,
            error_count,
            results,
        }
    }
}

/// Totals across several batch files
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub files_processed: usize,
    pub files_failed: usize,
    pub total_count: usize,
    pub malicious_count: usize,
    pub error_count: usize,
}

impl BatchSummary {
    pub fn add_report(&mut self, report: &BatchReport) {
        self.files_processed += 1;
        self.total_count += report.total_count;
        self.malicious_count += report.malicious_count;
        self.error_count += report.error_count;
    }

    pub fn add_failure(&mut self) {
        self.files_failed += 1;
    }

    pub fn non_malicious_count(&self) -> usize {
        self.total_count - self.malicious_count - self.error_count
    }
}

/// Non-blank records of a batch file, paired with their line numbers
pub fn split_records(content: &str, format: BatchFormat) -> Vec<(usize, String)> {
    let content = content.strip_prefix(BOM).unwrap_or(content);
    let skip = usize::from(format.skips_header());

    normalize_line_endings(content)
        .split('\n')
        .enumerate()
        .skip(skip)
        .filter_map(|(idx, line)| {
            let line = line.trim();
            (!line.is_empty()).then(|| (idx + 1, line.to_string()))
        })
        .collect()
}

impl ActivityClassifier {
    /// Classify every record of an in-memory batch
    pub fn classify_batch(
        &self,
        source: &str,
        content: &str,
        format: BatchFormat,
    ) -> Result<BatchReport, BatchError> {
        let records = split_records(content, format);
        if records.is_empty() {
            return Err(BatchError::NoDataRows);
        }

        let workers = self.batch_workers(records.len());
        debug!(source, records = records.len(), workers, "Classifying batch");

        let report = BatchReport::new(source, classify_parallel(self, &records, workers));

        info!(
            source,
            total = report.total_count,
            malicious = report.malicious_count,
            errors = report.error_count,
            "Batch classified"
        );

        Ok(report)
    }

    /// Read and classify a batch file
    pub fn classify_file(
        &self,
        path: impl AsRef<Path>,
        format: BatchFormat,
    ) -> Result<BatchReport, BatchError> {
        let path = path.as_ref();
        let source = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|source_err| BatchError::Io {
            path: source.clone(),
            source: source_err,
        })?;

        self.classify_batch(&source, &content, format)
    }

    fn batch_workers(&self, records: usize) -> usize {
        let configured = match self.config().batch_workers {
            0 => std::thread::available_parallelism().map_or(1, NonZeroUsize::get),
            n => n,
        };
        configured.clamp(1, records.max(1))
    }
}

/// Contiguous chunks per scoped worker, reassembled in input order
fn classify_parallel(
    classifier: &ActivityClassifier,
    records: &[(usize, String)],
    workers: usize,
) -> Vec<BatchEntry> {
    if records.is_empty() {
        return Vec::new();
    }

    let classify_chunk = |chunk: &[(usize, String)]| -> Vec<BatchEntry> {
        chunk
            .iter()
            .map(|(line_number, raw)| BatchEntry {
                line_number: *line_number,
                outcome: classifier.classify_activity(raw),
            })
            .collect()
    };

    if workers <= 1 {
        return classify_chunk(records);
    }

    let chunk_size = records.len().div_ceil(workers);

    std::thread::scope(|scope| {
        let handles: Vec<_> = records
            .chunks(chunk_size)
            .map(|chunk| scope.spawn(move || classify_chunk(chunk)))
            .collect();

        handles
            .into_iter()
            .flat_map(|handle| {
                handle
                    .join()
                    .unwrap_or_else(|payload| std::panic::resume_unwind(payload))
            })
            .collect()
    })
}
