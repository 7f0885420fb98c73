// Copyright 2024-, Semiotic AI, Inc.
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

use crate::{encoding::Encoding, source::BlockId};

/// Errors raised while requesting a block from a block source.
#[derive(Debug, Error)]
pub enum FetchError {
    /// [reqwest] library error, including request timeouts.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Endpoint is not an `http://` or `https://` URL.
    #[error("Invalid node endpoint: {0}")]
    InvalidEndpoint(String),

    /// Identifier cannot be expressed as a block number or tag for this source.
    #[error("Invalid block identifier: {0}")]
    InvalidBlockId(BlockId),

    /// Node answered with a JSON body that is not a block response.
    #[error("Malformed block response for {block_id}: {source}")]
    MalformedResponse {
        /// Requested block.
        block_id: BlockId,
        /// Parse failure.
        #[source]
        source: serde_json::Error,
    },

    /// Neither the response body nor its headers carry a consensus version.
    #[error("Missing consensus version for block {0}")]
    MissingVersion(BlockId),

    /// JSON-RPC request body could not be built.
    #[error("Request encoding error: {0}")]
    RequestEncoding(#[from] serde_json::Error),

    /// Execution node answered with a JSON-RPC error object.
    #[error("Execution node returned error {code} for block {block_id}: {message}")]
    Rpc {
        /// Requested block.
        block_id: BlockId,
        /// JSON-RPC error code.
        code: i64,
        /// JSON-RPC error message.
        message: String,
    },

    /// Node answered with an unexpected HTTP status.
    #[error("Node returned status {status} for block {block_id}: {message}")]
    Status {
        /// Requested block.
        block_id: BlockId,
        /// HTTP status code.
        status: u16,
        /// Response body, if any.
        message: String,
    },

    /// Source cannot serve blocks in this encoding.
    #[error("Blocks cannot be fetched as {0} from this source")]
    UnsupportedEncoding(Encoding),
}

/// Errors raised while turning a fetched block into bytes.
#[derive(Debug, Error)]
pub enum EncodingError {
    /// Block JSON does not decode as its fork's block, or cannot be serialized.
    #[error("Block JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Block JSON lacks a required field.
    #[error("Block JSON is missing field `{0}`")]
    MissingField(String),

    /// Payload was fetched in a different encoding than the one requested.
    #[error("Expected a {expected} payload, found {found}")]
    PayloadMismatch {
        /// Encoding requested for storage.
        expected: Encoding,
        /// Encoding of the fetched payload.
        found: Encoding,
    },

    /// SSZ bytes do not decode as their fork's signed block.
    #[error("Invalid SSZ block: {0}")]
    Ssz(String),

    /// Version tag does not name a known fork.
    #[error("Unsupported block version: {0}")]
    UnsupportedVersion(String),
}

/// Errors of the block retriever as a whole.
#[derive(Debug, Error)]
pub enum RetrieverError {
    /// [csv] library error while reading the block list.
    #[error("Block list error: {0}")]
    Csv(#[from] csv::Error),

    /// Fetched block could not be serialized.
    #[error("Encoding error: {0}")]
    Encoding(#[from] EncodingError),

    /// Block could not be fetched.
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Block list entry cannot be used as part of a file name.
    #[error("Block identifier `{0}` contains a path separator or `..`")]
    InvalidBlockId(String),

    /// [std::io] library error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
