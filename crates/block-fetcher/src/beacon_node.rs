// Copyright 2024-, Semiotic AI, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::time::Duration;

use reqwest::{header::ACCEPT, StatusCode};
use serde::Deserialize;
use tracing::{debug, info};

use crate::{
    encoding::Encoding,
    error::FetchError,
    source::{BlockId, BlockPayload, BlockSource, VersionedBlock},
};

/// Request timeout applied to every block request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const CONSENSUS_VERSION_HEADER: &str = "Eth-Consensus-Version";

/// JSON body of `GET /eth/v2/beacon/blocks/{block_id}`.
#[derive(Debug, Deserialize)]
struct BlockResponse {
    version: Option<String>,
    #[serde(default)]
    data: Option<serde_json::Value>,
}

/// [`BlockSource`] backed by the standard beacon node HTTP API.
#[derive(Clone, Debug)]
pub struct BeaconNodeClient {
    endpoint: String,
    http: reqwest::Client,
}

impl BeaconNodeClient {
    /// Builds a client for `endpoint`, e.g. `http://localhost:5052`.
    ///
    /// Every request is bounded by `timeout`.
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, FetchError> {
        let (endpoint, http) = http_client(endpoint, timeout)?;
        Ok(Self { endpoint, http })
    }

    /// Block endpoint for `id`.
    pub fn block_url(&self, id: &BlockId) -> String {
        format!("{}/eth/v2/beacon/blocks/{}", self.endpoint, id)
    }
}

impl BlockSource for BeaconNodeClient {
    async fn fetch_block(
        &self,
        id: &BlockId,
        encoding: Encoding,
    ) -> Result<Option<VersionedBlock>, FetchError> {
        let url = self.block_url(id);
        debug!(%url, %encoding, "requesting block");

        let response = self
            .http
            .get(&url)
            .header(ACCEPT, encoding.media_type())
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                block_id: id.clone(),
                status: status.as_u16(),
                message,
            });
        }

        let header_version = response
            .headers()
            .get(CONSENSUS_VERSION_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let body = response.bytes().await?;

        let block = decode_block_response(id, encoding, header_version, &body)?;
        if block.is_some() {
            info!(block_id = %id, "successfully got block");
        }
        Ok(block)
    }
}

/// Checks that `endpoint` is an HTTP(S) URL and builds a client bounded by
/// `timeout`. The endpoint is returned without its trailing slash.
pub(crate) fn http_client(
    endpoint: &str,
    timeout: Duration,
) -> Result<(String, reqwest::Client), FetchError> {
    let endpoint = endpoint.trim().trim_end_matches('/');
    if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
        return Err(FetchError::InvalidEndpoint(endpoint.to_string()));
    }
    let http = reqwest::Client::builder().timeout(timeout).build()?;
    Ok((endpoint.to_string(), http))
}

/// Turns a successful block response into a [`VersionedBlock`].
///
/// JSON responses carry their version in the body and fall back to the
/// `Eth-Consensus-Version` header; SSZ responses only have the header. A JSON
/// response whose `data` is `null` is treated as "no block".
pub(crate) fn decode_block_response(
    id: &BlockId,
    encoding: Encoding,
    header_version: Option<String>,
    body: &[u8],
) -> Result<Option<VersionedBlock>, FetchError> {
    match encoding {
        Encoding::Json => {
            let response: BlockResponse =
                serde_json::from_slice(body).map_err(|source| FetchError::MalformedResponse {
                    block_id: id.clone(),
                    source,
                })?;
            let Some(signed_block) = response.data.filter(|data| !data.is_null()) else {
                return Ok(None);
            };
            let version = response
                .version
                .or(header_version)
                .ok_or_else(|| FetchError::MissingVersion(id.clone()))?;
            Ok(Some(VersionedBlock {
                id: id.clone(),
                version,
                payload: BlockPayload::Json(signed_block),
            }))
        }
        Encoding::Ssz => {
            if body.is_empty() {
                return Ok(None);
            }
            let version = header_version.ok_or_else(|| FetchError::MissingVersion(id.clone()))?;
            Ok(Some(VersionedBlock {
                id: id.clone(),
                version,
                payload: BlockPayload::Ssz(body.to_vec()),
            }))
        }
    }
}
