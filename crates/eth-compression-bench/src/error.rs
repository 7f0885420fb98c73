// Copyright 2024-, Semiotic AI, Inc.
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

/// Fatal errors that end the process with a non-zero exit code.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Benchmark error: {0}")]
    Bench(#[from] compression_bench::BenchError),

    #[error("Block fetcher error: {0}")]
    Fetch(#[from] block_fetcher::RetrieverError),
}
