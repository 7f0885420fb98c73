// Copyright 2024-, Semiotic AI, Inc.
// SPDX-License-Identifier: Apache-2.0

#![deny(missing_docs)]

//! # Compression Bench
//!
//! Measure how well, and how fast, a general-purpose byte compressor handles
//! stored blocks.
//!
//! Every input file is read once and then compressed and decompressed
//! `iterations` times. Each trial yields a [`TrialSample`]; the samples of a
//! file form a [`FileMetricSet`], which is summarized into min/max/avg values
//! for the log and exported trial by trial to
//! `<metrics_folder>/<encoding>_<name>.csv`, see [`metrics_file_path`].
//!
//! ```no_run
//! # use std::path::PathBuf;
//! # use compression_bench::{run_benchmark, CodecKind, RunConfig};
//! let config = RunConfig {
//!     block_folder: PathBuf::from("raw-blocks"),
//!     metrics_folder: PathBuf::from("metrics"),
//!     encoding: "ssz".to_string(),
//!     iterations: 10,
//!     codec: CodecKind::Snappy,
//!     zstd_level: 3,
//! };
//! let reports = run_benchmark(&config)?;
//! # Ok::<(), compression_bench::BenchError>(())
//! ```
//!
//! Files are processed strictly one after another. A file that cannot be read,
//! summarized or exported is logged and skipped.

mod codec;
mod error;
mod export;
mod metrics;
mod runner;

pub use codec::{Codec, CodecKind, SnappyCodec, ZstdCodec};
pub use error::{BenchError, CodecError, ExportError, SummaryError};
pub use export::{
    export_metric_set, metrics_file_path, trial_row, Cell, Column, CsvSink, TabularSink,
};
pub use metrics::{Aggregate, FileMetricSet, Metric, Summary, TrialSample};
pub use runner::{
    discover_files, measure_trial, run, run_benchmark, FileOutcome, FileReport, RunConfig,
};
