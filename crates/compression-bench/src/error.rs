// Copyright 2024-, Semiotic AI, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by a [`Codec`](crate::Codec).
#[derive(Debug, Error)]
pub enum CodecError {
    /// [snap] library error.
    #[error("Snappy error: {0}")]
    Snappy(#[from] snap::Error),

    /// [zstd] library error.
    #[error("Zstd error: {0}")]
    Zstd(#[from] std::io::Error),
}

/// Summarizing a file's samples failed.
#[derive(Debug, Error)]
pub enum SummaryError {
    /// No valid trial was recorded for the file, either because no iteration
    /// was requested or because every trial was discarded.
    #[error("No valid samples to summarize for {file}")]
    NoSamples {
        /// Input file label.
        file: String,
    },
}

/// Errors raised while writing metrics rows.
#[derive(Debug, Error)]
pub enum ExportError {
    /// [csv] library error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// [std::io] library error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Row does not have one cell per column.
    #[error("Row has {found} cells, expected {expected}")]
    RowWidth {
        /// Number of columns of the sink.
        expected: usize,
        /// Number of cells in the rejected row.
        found: usize,
    },

    /// Another input of the same run already wrote this metrics file.
    #[error("Metrics file {} was already written in this run", .0.display())]
    DuplicateOutput(PathBuf),
}

/// Errors of the benchmark runner.
#[derive(Debug, Error)]
pub enum BenchError {
    /// A trial's compression or decompression failed.
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    /// Metrics could not be written.
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// [std::io] library error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Decompressed bytes differ from the input.
    #[error("Round trip mismatch: {raw_size} bytes in, {decoded_size} bytes out")]
    RoundTripMismatch {
        /// Length of the input buffer.
        raw_size: usize,
        /// Length of the decompressed buffer.
        decoded_size: usize,
    },

    /// A file's trials could not be summarized.
    #[error("Summary error: {0}")]
    Summary(#[from] SummaryError),

    /// [walkdir] library error while listing the block folder.
    #[error("Block folder error: {0}")]
    Walk(#[from] walkdir::Error),
}
