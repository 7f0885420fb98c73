// Copyright 2024-, Semiotic AI, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
    time::Instant,
};

use tracing::{debug, error, info};
use walkdir::WalkDir;

use crate::{
    codec::{Codec, CodecKind},
    error::{BenchError, ExportError, SummaryError},
    export::{export_metric_set, metrics_file_path, Column, CsvSink},
    metrics::{Aggregate, FileMetricSet, Metric, Summary, TrialSample},
};

/// Settings of one `run` invocation.
#[derive(Clone, Debug)]
pub struct RunConfig {
    /// Folder holding the stored blocks.
    pub block_folder: PathBuf,
    /// Folder receiving one CSV per benchmarked file.
    pub metrics_folder: PathBuf,
    /// Block encoding; selects input files by suffix and prefixes CSV names.
    pub encoding: String,
    /// Trials per file.
    pub iterations: usize,
    /// Compressor under test.
    pub codec: CodecKind,
    /// Level passed to zstd, ignored by snappy.
    pub zstd_level: i32,
}

/// What happened to a single input file.
#[derive(Debug)]
pub enum FileOutcome {
    /// Trials summarized and written to `path`.
    Exported {
        /// Metrics CSV written.
        path: PathBuf,
        /// Min/max/avg over the file's trials.
        summary: Summary,
        /// Data rows in the CSV.
        rows: usize,
    },
    /// Input could not be read.
    ReadFailed(std::io::Error),
    /// No trial survived, nothing exported.
    SummaryFailed(SummaryError),
    /// Metrics CSV could not be written.
    ExportFailed(ExportError),
}

/// Result of benchmarking one input file.
#[derive(Debug)]
pub struct FileReport {
    /// Input file as discovered.
    pub file: PathBuf,
    /// Trials dropped because compression or decompression failed.
    pub discarded_trials: usize,
    /// How processing the file ended.
    pub outcome: FileOutcome,
}

impl FileReport {
    /// Whether the file ended up with a metrics CSV.
    pub fn is_exported(&self) -> bool {
        matches!(self.outcome, FileOutcome::Exported { .. })
    }
}

/// Runs a whole `run` command: discovers the stored blocks of the configured
/// encoding and benchmarks each of them.
///
/// Only an unreadable block folder or a metrics folder that cannot be created
/// is returned as an error.
pub fn run_benchmark(config: &RunConfig) -> Result<Vec<FileReport>, BenchError> {
    info!(
        block_folder = %config.block_folder.display(),
        metrics_folder = %config.metrics_folder.display(),
        encoding = %config.encoding,
        iterations = config.iterations,
        codec = %config.codec,
        "launching compression benchmarks"
    );

    fs::create_dir_all(&config.metrics_folder)?;
    let files = discover_files(&config.block_folder, &format!(".{}", config.encoding))?;
    info!(folder = %config.block_folder.display(), files = files.len(), "found block files");

    let codec = config.codec.build(config.zstd_level);
    Ok(run(config, codec.as_ref(), &files))
}

/// Recursively collects the regular files under `folder` whose name ends with
/// `suffix`, in file name order. Symbolic links are not followed.
pub fn discover_files(folder: &Path, suffix: &str) -> Result<Vec<PathBuf>, BenchError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(folder).follow_links(false).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file()
            && entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.ends_with(suffix))
        {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Benchmarks each of `input_files` in turn with `codec`.
///
/// A file is fully processed, CSV included, before the next one is read. Two
/// inputs mapping to the same CSV fail the second export.
pub fn run(config: &RunConfig, codec: &dyn Codec, input_files: &[PathBuf]) -> Vec<FileReport> {
    let mut exported = HashSet::new();
    input_files
        .iter()
        .map(|file| benchmark_file(config, codec, file, &mut exported))
        .collect()
}

fn benchmark_file(
    config: &RunConfig,
    codec: &dyn Codec,
    file: &Path,
    exported: &mut HashSet<PathBuf>,
) -> FileReport {
    let relative = file.strip_prefix(&config.block_folder).unwrap_or(file);
    let label = relative.display().to_string();

    let raw = match fs::read(file) {
        Ok(raw) => raw,
        Err(e) => {
            error!(file = %label, error = %e, "unable to read file");
            return FileReport {
                file: file.to_path_buf(),
                discarded_trials: 0,
                outcome: FileOutcome::ReadFailed(e),
            };
        }
    };

    let mut metric_set = FileMetricSet::new(config.block_folder.display().to_string(), &label);
    let mut discarded_trials = 0;

    for iteration in 0..config.iterations {
        let sample = match measure_trial(codec, &raw) {
            Ok(sample) => sample,
            Err(e) => {
                error!(file = %label, iteration, error = %e, "trial discarded");
                discarded_trials += 1;
                continue;
            }
        };

        if metric_set.is_empty() {
            info!(
                file = %label,
                codec = codec.name(),
                raw_size = sample.raw_size,
                compressed_size = sample.compressed_size,
                "block sizes"
            );
        }
        debug!(
            file = %label,
            iteration,
            encoding_time_ns = sample.encode_time.as_nanos() as u64,
            decoding_time_ns = sample.decode_time.as_nanos() as u64,
            compress_ratio = sample.compression_ratio(),
            compress_speed = sample.compression_speed(),
            "trial"
        );
        metric_set.push(sample);
    }

    let outcome = match metric_set.summarize() {
        Ok(summary) => {
            log_summary(&label, &summary);
            let path = metrics_file_path(&config.metrics_folder, &config.encoding, relative);
            export(path, &label, &metric_set, summary, exported)
        }
        Err(e) => {
            error!(file = %label, error = %e, "unable to summarize, skipping export");
            FileOutcome::SummaryFailed(e)
        }
    };

    FileReport {
        file: file.to_path_buf(),
        discarded_trials,
        outcome,
    }
}

/// Times one whole-buffer compression and decompression of `raw`.
///
/// A decoded buffer that differs from `raw` fails the trial.
pub fn measure_trial(codec: &dyn Codec, raw: &[u8]) -> Result<TrialSample, BenchError> {
    let start = Instant::now();
    let compressed = codec.compress(raw)?;
    let encode_time = start.elapsed();

    let start = Instant::now();
    let decoded = codec.decompress(&compressed)?;
    let decode_time = start.elapsed();

    if decoded != raw {
        return Err(BenchError::RoundTripMismatch {
            raw_size: raw.len(),
            decoded_size: decoded.len(),
        });
    }

    Ok(TrialSample {
        raw_size: raw.len() as u64,
        compressed_size: compressed.len() as u64,
        encode_time,
        decode_time,
    })
}

fn log_summary(label: &str, summary: &Summary) {
    for aggregate in Aggregate::ALL {
        info!(
            file = %label,
            samples = summary.samples(),
            encoding_time_ns = summary.get(aggregate, Metric::EncodeTime),
            decoding_time_ns = summary.get(aggregate, Metric::DecodeTime),
            compress_ratio = summary.get(aggregate, Metric::CompressRatio),
            compress_speed = summary.get(aggregate, Metric::CompressSpeed),
            "{aggregate}"
        );
    }
}

fn export(
    path: PathBuf,
    label: &str,
    metric_set: &FileMetricSet,
    summary: Summary,
    exported: &mut HashSet<PathBuf>,
) -> FileOutcome {
    if exported.contains(&path) {
        error!(file = %label, metrics_file = %path.display(), "metrics file already written in this run");
        return FileOutcome::ExportFailed(ExportError::DuplicateOutput(path));
    }

    let written = CsvSink::create(&path, &Column::ALL)
        .and_then(|mut sink| export_metric_set(&mut sink, metric_set));

    match written {
        Ok(rows) => {
            debug!(file = %label, metrics_file = %path.display(), rows, "metrics exported");
            exported.insert(path.clone());
            FileOutcome::Exported {
                path,
                summary,
                rows,
            }
        }
        Err(e) => {
            error!(file = %label, metrics_file = %path.display(), error = %e, "unable to export metrics to csv file");
            FileOutcome::ExportFailed(e)
        }
    }
}
