// Copyright 2024-, Semiotic AI, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
    time::Duration,
};

use tracing::{error, info, warn};

use crate::{
    beacon_node::BeaconNodeClient,
    encoding::Encoding,
    error::{FetchError, RetrieverError},
    execution_node::ExecutionNodeClient,
    serialize::encode_block,
    source::{BlockId, BlockSource, Layer},
    targets::read_target_blocks,
};

/// Settings of one `fetch-blocks` invocation.
#[derive(Clone, Debug)]
pub struct FetchConfig {
    /// Beacon node HTTP endpoint, or execution node JSON-RPC endpoint.
    pub eth_node: String,
    /// Chain layer `eth_node` serves.
    pub layer: Layer,
    /// Encoding blocks are fetched and stored in.
    pub encoding: Encoding,
    /// CSV file listing the blocks to fetch.
    pub block_list: PathBuf,
    /// Folder the block files are written to.
    pub output_folder: PathBuf,
    /// Bound on every single request.
    pub timeout: Duration,
}

/// What happened to a single requested block.
#[derive(Debug)]
pub enum FetchOutcome {
    /// Block written to `path`.
    Stored {
        /// File the block was appended to.
        path: PathBuf,
        /// Number of bytes written.
        bytes: usize,
    },
    /// Source had no block for the identifier.
    NotProposed,
    /// Fetching, encoding or writing failed.
    Failed(RetrieverError),
}

/// Per-identifier outcomes of a batch, in request order.
#[derive(Debug, Default)]
pub struct FetchReport {
    /// Identifier and outcome of every requested block.
    pub outcomes: Vec<(BlockId, FetchOutcome)>,
}

impl FetchReport {
    /// Blocks written to disk.
    pub fn stored(&self) -> usize {
        self.count(|outcome| matches!(outcome, FetchOutcome::Stored { .. }))
    }

    /// Identifiers the source had no block for.
    pub fn not_proposed(&self) -> usize {
        self.count(|outcome| matches!(outcome, FetchOutcome::NotProposed))
    }

    /// Identifiers that failed.
    pub fn failed(&self) -> usize {
        self.count(|outcome| matches!(outcome, FetchOutcome::Failed(_)))
    }

    fn count(&self, predicate: impl Fn(&FetchOutcome) -> bool) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| predicate(outcome))
            .count()
    }
}

/// File name a block is stored under: `block_<id>.<encoding>`.
pub fn block_file_name(id: &BlockId, encoding: Encoding) -> String {
    format!("block_{id}.{encoding}")
}

/// Runs a whole `fetch-blocks` command.
///
/// An invalid endpoint, an encoding the layer cannot serve, an unreadable
/// block list or an output folder that cannot be created aborts before any
/// block is requested.
pub async fn run_fetch(config: &FetchConfig) -> Result<FetchReport, RetrieverError> {
    match config.layer {
        Layer::Consensus => {
            let client = BeaconNodeClient::new(&config.eth_node, config.timeout)?;
            fetch_listed(&client, config).await
        }
        Layer::Execution => {
            if config.encoding != Encoding::Json {
                return Err(FetchError::UnsupportedEncoding(config.encoding).into());
            }
            let client = ExecutionNodeClient::new(&config.eth_node, config.timeout)?;
            fetch_listed(&client, config).await
        }
    }
}

async fn fetch_listed<S: BlockSource>(
    source: &S,
    config: &FetchConfig,
) -> Result<FetchReport, RetrieverError> {
    let block_ids = read_target_blocks(&config.block_list)?;

    info!(
        layer = %config.layer,
        block_list = %config.block_list.display(),
        blocks = block_ids.len(),
        "client ready, requesting blocks"
    );

    fetch_and_store(source, &block_ids, config.encoding, &config.output_folder).await
}

/// Fetches every block in `block_ids` from `source`, in order, and appends its
/// serialized bytes to `output_dir/block_<id>.<encoding>`.
///
/// Only a failure to create `output_dir` is returned as an error. Per-block
/// failures are logged and recorded in the returned [`FetchReport`].
pub async fn fetch_and_store<S: BlockSource>(
    source: &S,
    block_ids: &[BlockId],
    encoding: Encoding,
    output_dir: &Path,
) -> Result<FetchReport, RetrieverError> {
    fs::create_dir_all(output_dir)?;

    let mut report = FetchReport::default();
    for id in block_ids {
        let outcome = match fetch_one(source, id, encoding, output_dir).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(block_id = %id, error = %e, "unable to store block");
                FetchOutcome::Failed(e)
            }
        };
        report.outcomes.push((id.clone(), outcome));
    }

    info!(
        stored = report.stored(),
        not_proposed = report.not_proposed(),
        failed = report.failed(),
        "block fetching finished"
    );
    Ok(report)
}

async fn fetch_one<S: BlockSource>(
    source: &S,
    id: &BlockId,
    encoding: Encoding,
    output_dir: &Path,
) -> Result<FetchOutcome, RetrieverError> {
    let Some(block) = source.fetch_block(id, encoding).await? else {
        warn!(block_id = %id, "block not found, was it proposed?");
        return Ok(FetchOutcome::NotProposed);
    };

    let bytes = encode_block(&block, encoding)?;
    let path = output_dir.join(block_file_name(id, encoding));
    persist_block(&path, &bytes)?;

    info!(block_id = %id, version = %block.version, bytes = bytes.len(), path = %path.display(), "block stored");
    Ok(FetchOutcome::Stored {
        path,
        bytes: bytes.len(),
    })
}

/// Appends `bytes` to the file at `path`, creating it if needed.
pub fn persist_block(path: &Path, bytes: &[u8]) -> Result<(), RetrieverError> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(bytes)?;
    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_file_name() {
        assert_eq!(
            block_file_name(&BlockId::from(9881091), Encoding::Ssz),
            "block_9881091.ssz"
        );
        assert_eq!(
            block_file_name(&BlockId::from("head"), Encoding::Json),
            "block_head.json"
        );
    }

    #[test]
    fn test_persist_block_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("block_1.ssz");

        persist_block(&path, b"abc").unwrap();
        persist_block(&path, b"def").unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"abcdef");
    }

    #[tokio::test]
    async fn test_run_fetch_rejects_bad_endpoint_before_reading_list() {
        let dir = tempfile::tempdir().unwrap();
        let config = FetchConfig {
            eth_node: "localhost".to_string(),
            layer: Layer::Consensus,
            encoding: Encoding::Json,
            block_list: dir.path().join("missing.csv"),
            output_folder: dir.path().join("out"),
            timeout: Duration::from_secs(1),
        };

        let err = run_fetch(&config).await.unwrap_err();
        assert!(matches!(
            err,
            RetrieverError::Fetch(FetchError::InvalidEndpoint(_))
        ));
        assert!(!config.output_folder.exists());
    }

    #[tokio::test]
    async fn test_run_fetch_with_unreadable_block_list() {
        let dir = tempfile::tempdir().unwrap();
        let config = FetchConfig {
            eth_node: "http://localhost:5052".to_string(),
            layer: Layer::Consensus,
            encoding: Encoding::Ssz,
            block_list: dir.path().join("missing.csv"),
            output_folder: dir.path().join("out"),
            timeout: Duration::from_secs(1),
        };

        let err = run_fetch(&config).await.unwrap_err();
        assert!(matches!(err, RetrieverError::Csv(_)));
    }

    #[tokio::test]
    async fn test_execution_layer_refuses_ssz_before_reading_list() {
        let dir = tempfile::tempdir().unwrap();
        let config = FetchConfig {
            eth_node: "http://localhost:8545".to_string(),
            layer: Layer::Execution,
            encoding: Encoding::Ssz,
            block_list: dir.path().join("missing.csv"),
            output_folder: dir.path().join("out"),
            timeout: Duration::from_secs(1),
        };

        let err = run_fetch(&config).await.unwrap_err();
        assert!(matches!(
            err,
            RetrieverError::Fetch(FetchError::UnsupportedEncoding(Encoding::Ssz))
        ));
        assert!(!config.output_folder.exists());
    }

    #[tokio::test]
    async fn test_execution_layer_with_unreadable_block_list() {
        let dir = tempfile::tempdir().unwrap();
        let config = FetchConfig {
            eth_node: "http://localhost:8545".to_string(),
            layer: Layer::Execution,
            encoding: Encoding::Json,
            block_list: dir.path().join("missing.csv"),
            output_folder: dir.path().join("out"),
            timeout: Duration::from_secs(1),
        };

        let err = run_fetch(&config).await.unwrap_err();
        assert!(matches!(err, RetrieverError::Csv(_)));
    }
}
