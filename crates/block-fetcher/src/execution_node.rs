// Copyright 2024-, Semiotic AI, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::{
    beacon_node::http_client,
    encoding::Encoding,
    error::FetchError,
    source::{BlockId, BlockPayload, BlockSource, VersionedBlock},
};

/// Version tag of blocks fetched from an execution node.
pub const EXECUTION_VERSION: &str = "execution";

const GET_BLOCK_BY_NUMBER: &str = "eth_getBlockByNumber";

/// Block object members that belong to the block body.
const BODY_FIELDS: [&str; 3] = ["transactions", "uncles", "withdrawals"];

const BLOCK_TAGS: [&str; 5] = ["latest", "earliest", "pending", "safe", "finalized"];

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'static str,
    /// Block quantity or tag, and whether to include full transactions.
    params: (&'a str, bool),
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

/// [`BlockSource`] backed by an execution node's JSON-RPC API.
///
/// Blocks are requested with `eth_getBlockByNumber` including full
/// transactions. Only [`Encoding::Json`] is served.
#[derive(Clone, Debug)]
pub struct ExecutionNodeClient {
    endpoint: String,
    http: reqwest::Client,
}

impl ExecutionNodeClient {
    /// Builds a client for `endpoint`, e.g. `http://localhost:8545`.
    ///
    /// Every request is bounded by `timeout`.
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, FetchError> {
        let (endpoint, http) = http_client(endpoint, timeout)?;
        Ok(Self { endpoint, http })
    }
}

impl BlockSource for ExecutionNodeClient {
    async fn fetch_block(
        &self,
        id: &BlockId,
        encoding: Encoding,
    ) -> Result<Option<VersionedBlock>, FetchError> {
        if encoding != Encoding::Json {
            return Err(FetchError::UnsupportedEncoding(encoding));
        }
        let request = rpc_request_body(id)?;
        debug!(endpoint = %self.endpoint, block_id = %id, "requesting execution block");

        let response = self
            .http
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .body(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                block_id: id.clone(),
                status: status.as_u16(),
                message,
            });
        }

        let body = response.bytes().await?;
        let block = decode_rpc_response(id, &body)?;
        if block.is_some() {
            info!(block_id = %id, "successfully got block");
        }
        Ok(block)
    }
}

/// Hex quantity or tag `id` stands for in a JSON-RPC call.
pub(crate) fn block_quantity(id: &BlockId) -> Result<String, FetchError> {
    let text = id.as_str();
    if let Ok(number) = text.parse::<u64>() {
        return Ok(format!("{number:#x}"));
    }
    if BLOCK_TAGS.contains(&text) {
        return Ok(text.to_string());
    }
    let is_quantity = text.strip_prefix("0x").is_some_and(|digits| {
        !digits.is_empty() && digits.len() <= 16 && digits.chars().all(|c| c.is_ascii_hexdigit())
    });
    if is_quantity {
        return Ok(text.to_string());
    }
    Err(FetchError::InvalidBlockId(id.clone()))
}

pub(crate) fn rpc_request_body(id: &BlockId) -> Result<Vec<u8>, FetchError> {
    let quantity = block_quantity(id)?;
    let request = RpcRequest {
        jsonrpc: "2.0",
        id: 1,
        method: GET_BLOCK_BY_NUMBER,
        params: (quantity.as_str(), true),
    };
    Ok(serde_json::to_vec(&request)?)
}

/// Turns a JSON-RPC block response into a [`VersionedBlock`].
///
/// A `null` result means the node has no such block.
pub(crate) fn decode_rpc_response(
    id: &BlockId,
    body: &[u8],
) -> Result<Option<VersionedBlock>, FetchError> {
    let malformed = |source: serde_json::Error| FetchError::MalformedResponse {
        block_id: id.clone(),
        source,
    };
    let response: RpcResponse = serde_json::from_slice(body).map_err(malformed)?;
    if let Some(error) = response.error {
        return Err(FetchError::Rpc {
            block_id: id.clone(),
            code: error.code,
            message: error.message,
        });
    }

    let Some(mut header) =
        serde_json::from_value::<Option<Map<String, Value>>>(response.result).map_err(malformed)?
    else {
        return Ok(None);
    };
    let body: Map<String, Value> = BODY_FIELDS
        .iter()
        .filter_map(|field| header.remove_entry(*field))
        .collect();

    Ok(Some(VersionedBlock {
        id: id.clone(),
        version: EXECUTION_VERSION.to_string(),
        payload: BlockPayload::Execution {
            header: Value::Object(header),
            body: Value::Object(body),
        },
    }))
}
