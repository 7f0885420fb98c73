// Copyright 2024-, Semiotic AI, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::{fmt, future::Future};

use clap::ValueEnum;

use crate::{encoding::Encoding, error::FetchError};

/// Identifier of a requested block: a slot or block number, a tag such as
/// `head` or `finalized`, or a `0x` prefixed value.
///
/// Kept as text so it can be used verbatim in request paths and file names.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BlockId(String);

impl BlockId {
    /// Wraps an identifier as written in the block list.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BlockId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<u64> for BlockId {
    fn from(slot: u64) -> Self {
        Self(slot.to_string())
    }
}

/// Chain layer blocks are fetched from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Layer {
    /// Beacon blocks from a beacon node HTTP API.
    #[default]
    Consensus,
    /// Execution blocks from an execution node JSON-RPC endpoint.
    Execution,
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Layer::Consensus => f.write_str("consensus"),
            Layer::Execution => f.write_str("execution"),
        }
    }
}

/// Block content as returned by a block source.
#[derive(Clone, Debug, PartialEq)]
pub enum BlockPayload {
    /// The signed beacon block object, `{"message": ..., "signature": ...}`.
    Json(serde_json::Value),
    /// SSZ bytes of the signed beacon block.
    Ssz(Vec<u8>),
    /// Execution block split into its header and its body.
    Execution {
        /// Header fields of the JSON-RPC block object.
        header: serde_json::Value,
        /// `transactions`, `uncles` and, when present, `withdrawals`.
        body: serde_json::Value,
    },
}

impl BlockPayload {
    /// Encoding the payload was fetched in.
    pub fn encoding(&self) -> Encoding {
        match self {
            BlockPayload::Json(_) | BlockPayload::Execution { .. } => Encoding::Json,
            BlockPayload::Ssz(_) => Encoding::Ssz,
        }
    }
}

/// A fetched block tagged with the version reported by the source.
#[derive(Clone, Debug, PartialEq)]
pub struct VersionedBlock {
    /// Identifier the block was requested with.
    pub id: BlockId,
    /// Consensus fork tag, or `execution` for execution blocks.
    pub version: String,
    /// Block content.
    pub payload: BlockPayload,
}

/// Anything able to hand out blocks by identifier.
///
/// `Ok(None)` means the source has no block for the identifier, which for a
/// slot usually means no block was proposed. It is not an error.
pub trait BlockSource {
    /// Fetches the block `id` in `encoding`.
    fn fetch_block(
        &self,
        id: &BlockId,
        encoding: Encoding,
    ) -> impl Future<Output = Result<Option<VersionedBlock>, FetchError>>;
}
