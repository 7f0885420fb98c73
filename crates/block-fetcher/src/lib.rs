// Copyright 2024-, Semiotic AI, Inc.
// SPDX-License-Identifier: Apache-2.0

#![deny(missing_docs)]

//! # Block Fetcher
//!
//! Download beacon blocks from a beacon node, or execution blocks from an
//! execution node, and store each one on disk in the requested wire encoding,
//! so that they can later be fed to the compression benchmarks.
//!
//! Beacon blocks are decoded into the typed signed block of the fork named by
//! their version and serialized again from it, so a stored file always holds a
//! well-formed block. Execution blocks are stored as header JSON followed by
//! body JSON.
//!
//! ## Fetching a list of blocks
//!
//! ```no_run
//! # use std::{path::Path, time::Duration};
//! # use block_fetcher::{fetch_and_store, BeaconNodeClient, BlockId, Encoding};
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), block_fetcher::RetrieverError> {
//! let client = BeaconNodeClient::new("http://localhost:5052", Duration::from_secs(10))?;
//! let ids = [BlockId::from(9881091), BlockId::from("head")];
//!
//! let report = fetch_and_store(&client, &ids, Encoding::Ssz, Path::new("raw-blocks")).await?;
//! println!("stored {} blocks", report.stored());
//! # Ok(())
//! # }
//! ```
//!
//! Blocks are requested strictly one after the other. A failure on one
//! identifier is logged and the batch carries on with the next one; a slot
//! without a block is reported as [`FetchOutcome::NotProposed`].

mod beacon_node;
mod encoding;
mod error;
mod execution_node;
mod fork;
mod retriever;
mod serialize;
mod source;
mod targets;

pub use beacon_node::{BeaconNodeClient, DEFAULT_TIMEOUT};
pub use encoding::Encoding;
pub use error::{EncodingError, FetchError, RetrieverError};
pub use execution_node::{ExecutionNodeClient, EXECUTION_VERSION};
pub use fork::Fork;
pub use retriever::{
    block_file_name, fetch_and_store, persist_block, run_fetch, FetchConfig, FetchOutcome,
    FetchReport,
};
pub use serialize::{decode_json, decode_ssz, encode_block, SignedBlock};
pub use source::{BlockId, BlockPayload, BlockSource, Layer, VersionedBlock};
pub use targets::{read_target_blocks, read_target_blocks_from_reader};
