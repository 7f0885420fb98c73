// Copyright 2024-, Semiotic AI, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::{path::PathBuf, time::Duration};

use block_fetcher::{Encoding, FetchConfig, Layer};
use clap::{Parser, Subcommand};
use compression_bench::{CodecKind, RunConfig};

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compress and decompress every stored block, exporting each trial to csv
    Run {
        /// folder holding the blocks to benchmark
        #[clap(long)]
        block_folder: PathBuf,
        /// folder where one csv per block is written
        #[clap(long)]
        metrics_folder: PathBuf,
        /// encoding of the stored blocks, only files with this extension are used
        #[clap(long, value_enum)]
        encoding: Encoding,
        /// compress/decompress trials per block
        #[clap(short, long, default_value_t = 10)]
        iterations: usize,
        /// compressor to benchmark
        #[clap(long, value_enum, default_value_t = CodecKind::Snappy)]
        codec: CodecKind,
        /// zstd compression level, only used with `--codec zstd`
        #[clap(long, default_value_t = 3)]
        zstd_level: i32,
    },
    /// Download the blocks listed in a csv file from a beacon or execution node
    FetchBlocks {
        /// beacon node HTTP endpoint, or execution node JSON-RPC endpoint
        #[clap(long, env = "ETH_NODE_ENDPOINT")]
        eth_node: String,
        /// chain layer served by `--eth-node`; execution blocks are json only
        #[clap(long, value_enum, default_value_t = Layer::Consensus)]
        layer: Layer,
        /// encoding the blocks are requested and stored in
        #[clap(long, value_enum)]
        encoding: Encoding,
        /// csv file with a header row and one block identifier per row
        #[clap(long)]
        block_list: PathBuf,
        /// folder where the raw blocks are stored
        #[clap(long)]
        output_folder: PathBuf,
        /// request timeout in seconds
        #[clap(long, default_value_t = 10)]
        timeout_secs: u64,
    },
}

/// Immutable settings of the selected command.
#[derive(Debug)]
pub enum Config {
    Run(RunConfig),
    Fetch(FetchConfig),
}

impl From<Commands> for Config {
    fn from(command: Commands) -> Self {
        match command {
            Commands::Run {
                block_folder,
                metrics_folder,
                encoding,
                iterations,
                codec,
                zstd_level,
            } => Config::Run(RunConfig {
                block_folder,
                metrics_folder,
                encoding: encoding.to_string(),
                iterations,
                codec,
                zstd_level,
            }),
            Commands::FetchBlocks {
                eth_node,
                layer,
                encoding,
                block_list,
                output_folder,
                timeout_secs,
            } => Config::Fetch(FetchConfig {
                eth_node,
                layer,
                encoding,
                block_list,
                output_folder,
                timeout: Duration::from_secs(timeout_secs),
            }),
        }
    }
}
