// Copyright 2024-, Semiotic AI, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::{fmt, time::Duration};

use crate::error::SummaryError;

/// One compress + decompress measurement on a fixed input buffer.
///
/// Ratio and speed are always derived from the stored sizes and durations.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrialSample {
    /// Input size in bytes.
    pub raw_size: u64,
    /// Compressor output size in bytes.
    pub compressed_size: u64,
    /// Wall time of the compression.
    pub encode_time: Duration,
    /// Wall time of the decompression.
    pub decode_time: Duration,
}

impl TrialSample {
    /// `raw_size / compressed_size`.
    pub fn compression_ratio(&self) -> f64 {
        self.raw_size as f64 / self.compressed_size as f64
    }

    /// Raw bytes compressed per nanosecond of encode time.
    ///
    /// An encode time below the clock resolution counts as one nanosecond.
    pub fn compression_speed(&self) -> f64 {
        self.raw_size as f64 / nanos(self.encode_time).max(1.0)
    }

    /// Value of `metric` for this trial; durations in nanoseconds.
    pub fn metric(&self, metric: Metric) -> f64 {
        match metric {
            Metric::EncodeTime => nanos(self.encode_time),
            Metric::DecodeTime => nanos(self.decode_time),
            Metric::CompressRatio => self.compression_ratio(),
            Metric::CompressSpeed => self.compression_speed(),
        }
    }
}

fn nanos(duration: Duration) -> f64 {
    duration.as_nanos() as f64
}

/// Derived metrics a [`Summary`] aggregates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Metric {
    /// Compression time in nanoseconds.
    EncodeTime,
    /// Decompression time in nanoseconds.
    DecodeTime,
    /// See [`TrialSample::compression_ratio`].
    CompressRatio,
    /// See [`TrialSample::compression_speed`].
    CompressSpeed,
}

impl Metric {
    /// Every metric, in log and column order.
    pub const ALL: [Metric; 4] = [
        Metric::EncodeTime,
        Metric::DecodeTime,
        Metric::CompressRatio,
        Metric::CompressSpeed,
    ];

    fn index(self) -> usize {
        match self {
            Metric::EncodeTime => 0,
            Metric::DecodeTime => 1,
            Metric::CompressRatio => 2,
            Metric::CompressSpeed => 3,
        }
    }

    /// Field name used in logs.
    pub fn label(self) -> &'static str {
        match self {
            Metric::EncodeTime => "encoding-time",
            Metric::DecodeTime => "decoding-time",
            Metric::CompressRatio => "compress-ratio",
            Metric::CompressSpeed => "compress-speed",
        }
    }
}

/// Aggregations computed by a [`Summary`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Aggregate {
    /// Smallest value, first one on ties.
    Min,
    /// Largest value, first one on ties.
    Max,
    /// Arithmetic mean.
    Avg,
}

impl Aggregate {
    /// Every aggregate, in log order.
    pub const ALL: [Aggregate; 3] = [Aggregate::Min, Aggregate::Max, Aggregate::Avg];

    fn index(self) -> usize {
        match self {
            Aggregate::Min => 0,
            Aggregate::Max => 1,
            Aggregate::Avg => 2,
        }
    }

    /// Upper-case name used as the log message.
    pub fn label(self) -> &'static str {
        match self {
            Aggregate::Min => "MIN",
            Aggregate::Max => "MAX",
            Aggregate::Avg => "AVG",
        }
    }
}

impl fmt::Display for Aggregate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Min/max/avg of every [`Metric`] over a file's trials.
///
/// Computed once; independent of the samples afterwards.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Summary {
    values: [[f64; 4]; 3],
    samples: usize,
}

impl Summary {
    /// `aggregate` of `metric` over the summarized trials.
    pub fn get(&self, aggregate: Aggregate, metric: Metric) -> f64 {
        self.values[aggregate.index()][metric.index()]
    }

    /// Number of trials the summary was computed from.
    pub fn samples(&self) -> usize {
        self.samples
    }
}

/// Ordered trials of one input file.
#[derive(Clone, Debug)]
pub struct FileMetricSet {
    folder: String,
    file_name: String,
    samples: Vec<TrialSample>,
}

impl FileMetricSet {
    /// Empty set for `file_name`, found under `folder`.
    pub fn new(folder: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            folder: folder.into(),
            file_name: file_name.into(),
            samples: Vec::new(),
        }
    }

    /// Appends a trial.
    pub fn push(&mut self, sample: TrialSample) {
        self.samples.push(sample);
    }

    /// Block folder the file was found in.
    pub fn folder(&self) -> &str {
        &self.folder
    }

    /// File label, relative to the block folder.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Trials in recording order.
    pub fn samples(&self) -> &[TrialSample] {
        &self.samples
    }

    /// Number of recorded trials.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether no trial was recorded.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Computes min, max and mean of every metric.
    ///
    /// Ties keep the first value encountered. Fails with
    /// [`SummaryError::NoSamples`] when there is nothing to summarize.
    pub fn summarize(&self) -> Result<Summary, SummaryError> {
        if self.samples.is_empty() {
            return Err(SummaryError::NoSamples {
                file: self.file_name.clone(),
            });
        }

        let mut values = [[0.0; 4]; 3];
        for metric in Metric::ALL {
            let (min, max, avg) = min_max_mean(self.samples.iter().map(|s| s.metric(metric)));
            values[Aggregate::Min.index()][metric.index()] = min;
            values[Aggregate::Max.index()][metric.index()] = max;
            values[Aggregate::Avg.index()][metric.index()] = avg;
        }

        Ok(Summary {
            values,
            samples: self.samples.len(),
        })
    }
}

/// Caller guarantees at least one value.
fn min_max_mean(mut values: impl Iterator<Item = f64>) -> (f64, f64, f64) {
    let first = values.next().unwrap_or_default();
    let (mut min, mut max, mut sum, mut count) = (first, first, first, 1usize);
    for value in values {
        if value < min {
            min = value;
        }
        if value > max {
            max = value;
        }
        sum += value;
        count += 1;
    }
    // rounding in the sum can push the mean just outside [min, max]
    let mean = (sum / count as f64).clamp(min, max);
    (min, max, mean)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(compressed_size: u64, encode_ns: u64, decode_ns: u64) -> TrialSample {
        TrialSample {
            raw_size: 1000,
            compressed_size,
            encode_time: Duration::from_nanos(encode_ns),
            decode_time: Duration::from_nanos(decode_ns),
        }
    }

    #[test]
    fn test_derived_metrics() {
        let s = sample(250, 500, 100);
        assert_eq!(s.compression_ratio(), 4.0);
        assert_eq!(s.compression_speed(), 2.0);
        assert_eq!(s.metric(Metric::EncodeTime), 500.0);
        assert_eq!(s.metric(Metric::DecodeTime), 100.0);
    }

    #[test]
    fn test_zero_encode_time_keeps_speed_finite() {
        let s = sample(10, 0, 0);
        assert_eq!(s.compression_speed(), 1000.0);
    }

    #[test]
    fn test_summary_min_max_avg() {
        let mut set = FileMetricSet::new("raw-blocks", "block_1.ssz");
        set.push(sample(500, 300, 30));
        set.push(sample(250, 100, 10));
        set.push(sample(100, 200, 50));

        let summary = set.summarize().unwrap();

        assert_eq!(summary.samples(), 3);
        assert_eq!(summary.get(Aggregate::Min, Metric::EncodeTime), 100.0);
        assert_eq!(summary.get(Aggregate::Max, Metric::EncodeTime), 300.0);
        assert_eq!(summary.get(Aggregate::Avg, Metric::EncodeTime), 200.0);
        assert_eq!(summary.get(Aggregate::Min, Metric::CompressRatio), 2.0);
        assert_eq!(summary.get(Aggregate::Max, Metric::CompressRatio), 10.0);
        assert_eq!(summary.get(Aggregate::Avg, Metric::CompressRatio), 16.0 / 3.0);
    }

    #[test]
    fn test_decode_average_uses_decode_samples() {
        let mut set = FileMetricSet::new("raw-blocks", "block_1.ssz");
        set.push(sample(100, 1_000, 10));
        set.push(sample(100, 3_000, 30));

        let summary = set.summarize().unwrap();

        assert_eq!(summary.get(Aggregate::Avg, Metric::DecodeTime), 20.0);
        assert_eq!(summary.get(Aggregate::Avg, Metric::EncodeTime), 2_000.0);
    }

    #[test]
    fn test_empty_set_cannot_be_summarized() {
        let set = FileMetricSet::new("raw-blocks", "block_9.json");
        let err = set.summarize().unwrap_err();
        assert_eq!(
            err.to_string(),
            "No valid samples to summarize for block_9.json"
        );
    }

    #[test]
    fn test_min_le_avg_le_max() {
        let mut set = FileMetricSet::new("f", "x");
        for _ in 0..3 {
            set.push(TrialSample {
                raw_size: 1,
                compressed_size: 10,
                encode_time: Duration::from_nanos(7),
                decode_time: Duration::from_nanos(3),
            });
        }
        for seed in 1..50u64 {
            set.push(sample(seed * 7 % 97 + 1, seed * 13 % 101, seed * 17 % 89));
        }

        let summary = set.summarize().unwrap();
        for metric in Metric::ALL {
            let min = summary.get(Aggregate::Min, metric);
            let avg = summary.get(Aggregate::Avg, metric);
            let max = summary.get(Aggregate::Max, metric);
            assert!(min <= avg && avg <= max, "{metric:?}: {min} {avg} {max}");
        }
    }

    #[test]
    fn test_single_sample_summary_is_flat() {
        let mut set = FileMetricSet::new("f", "x");
        set.push(TrialSample {
            raw_size: 1,
            compressed_size: 10,
            encode_time: Duration::from_nanos(3),
            decode_time: Duration::from_nanos(3),
        });
        let summary = set.summarize().unwrap();
        for metric in Metric::ALL {
            let value = set.samples()[0].metric(metric);
            for aggregate in Aggregate::ALL {
                assert_eq!(summary.get(aggregate, metric), value);
            }
        }
    }
}
