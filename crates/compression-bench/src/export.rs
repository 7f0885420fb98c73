// Copyright 2024-, Semiotic AI, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::{
    fs::File,
    io::{self, Write},
    path::{Component, Path, PathBuf},
    time::Duration,
};

use crate::{
    error::ExportError,
    metrics::{FileMetricSet, TrialSample},
};

/// Columns of a metrics CSV, in file order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Column {
    /// Block folder the input was found in.
    Folder,
    /// Input path relative to the block folder.
    File,
    /// Input size in bytes.
    RawSize,
    /// Compressed size in bytes.
    CompressSize,
    /// Compression time in nanoseconds.
    EncodingTime,
    /// Decompression time in nanoseconds.
    DecodingTime,
    /// Raw size over compressed size.
    CompressRatio,
    /// Raw bytes per nanosecond of compression.
    CompressSpeed,
}

impl Column {
    /// Every column, in file order.
    pub const ALL: [Column; 8] = [
        Column::Folder,
        Column::File,
        Column::RawSize,
        Column::CompressSize,
        Column::EncodingTime,
        Column::DecodingTime,
        Column::CompressRatio,
        Column::CompressSpeed,
    ];

    /// Header row label.
    pub fn header(self) -> &'static str {
        match self {
            Column::Folder => "folder",
            Column::File => "file",
            Column::RawSize => "raw-size",
            Column::CompressSize => "compress-size",
            Column::EncodingTime => "encoding-time",
            Column::DecodingTime => "decoding-time",
            Column::CompressRatio => "compress-ratio",
            Column::CompressSpeed => "compress-speed",
        }
    }
}

/// A typed value of one row cell.
#[derive(Clone, Debug, PartialEq)]
pub enum Cell {
    /// Plain decimal.
    Int(u64),
    /// Six decimal digits.
    Float(f64),
    /// Verbatim.
    Text(String),
    /// Integer nanosecond count.
    Duration(Duration),
}

impl Cell {
    /// Text written to the sink for this cell.
    pub fn render(&self) -> String {
        match self {
            Cell::Int(value) => render_int(*value),
            Cell::Float(value) => render_float(*value),
            Cell::Text(value) => value.clone(),
            Cell::Duration(value) => render_duration(*value),
        }
    }
}

fn render_int(value: u64) -> String {
    value.to_string()
}

fn render_float(value: f64) -> String {
    format!("{value:.6}")
}

/// Nanosecond count.
fn render_duration(value: Duration) -> String {
    value.as_nanos().to_string()
}

/// Destination for rows of typed cells.
pub trait TabularSink {
    /// Appends one row; it must have one cell per column.
    fn write_row(&mut self, row: &[Cell]) -> Result<(), ExportError>;

    /// Flushes everything written so far.
    fn finish(&mut self) -> Result<(), ExportError>;
}

/// [`TabularSink`] writing comma separated values, header first.
pub struct CsvSink<W: Write> {
    writer: csv::Writer<W>,
    width: usize,
}

impl CsvSink<File> {
    /// Creates (or truncates) the CSV file at `path` and writes the header.
    pub fn create(path: impl AsRef<Path>, columns: &[Column]) -> Result<Self, ExportError> {
        let writer = csv::Writer::from_path(path)?;
        Self::with_header(writer, columns)
    }
}

impl<W: Write> CsvSink<W> {
    /// Wraps `writer` and writes the header.
    pub fn from_writer(writer: W, columns: &[Column]) -> Result<Self, ExportError> {
        Self::with_header(csv::Writer::from_writer(writer), columns)
    }

    fn with_header(mut writer: csv::Writer<W>, columns: &[Column]) -> Result<Self, ExportError> {
        writer.write_record(columns.iter().map(|column| column.header()))?;
        Ok(Self {
            writer,
            width: columns.len(),
        })
    }

    /// Flushes and hands back the underlying writer.
    pub fn into_inner(self) -> Result<W, ExportError> {
        self.writer
            .into_inner()
            .map_err(|e| ExportError::Io(io::Error::new(e.error().kind(), e.error().to_string())))
    }
}

impl<W: Write> TabularSink for CsvSink<W> {
    fn write_row(&mut self, row: &[Cell]) -> Result<(), ExportError> {
        if row.len() != self.width {
            return Err(ExportError::RowWidth {
                expected: self.width,
                found: row.len(),
            });
        }
        self.writer.write_record(row.iter().map(Cell::render))?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), ExportError> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Cells of one trial, in [`Column::ALL`] order.
pub fn trial_row(folder: &str, file_name: &str, sample: &TrialSample) -> [Cell; 8] {
    [
        Cell::Text(folder.to_string()),
        Cell::Text(file_name.to_string()),
        Cell::Int(sample.raw_size),
        Cell::Int(sample.compressed_size),
        Cell::Duration(sample.encode_time),
        Cell::Duration(sample.decode_time),
        Cell::Float(sample.compression_ratio()),
        Cell::Float(sample.compression_speed()),
    ]
}

/// Writes one row per trial of `set` and flushes the sink.
///
/// Returns the number of rows written.
pub fn export_metric_set<S: TabularSink>(
    sink: &mut S,
    set: &FileMetricSet,
) -> Result<usize, ExportError> {
    for sample in set.samples() {
        sink.write_row(&trial_row(set.folder(), set.file_name(), sample))?;
    }
    sink.finish()?;
    Ok(set.len())
}

/// `<metrics_folder>/<encoding>_<name>.csv` for an input at `relative`, a path
/// relative to the block folder.
///
/// `<name>` is the input's parent directories followed by its file name up to
/// the first `.`, joined with `_`: `nested/block_1.ssz` gives `nested_block_1`.
pub fn metrics_file_path(metrics_folder: &Path, encoding: &str, relative: &Path) -> PathBuf {
    let mut parts: Vec<String> = relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    if let Some(file_name) = parts.pop() {
        let stem = file_name
            .split_once('.')
            .map_or(file_name.as_str(), |(stem, _)| stem);
        parts.push(stem.to_string());
    }
    metrics_folder.join(format!("{encoding}_{}.csv", parts.join("_")))
}
