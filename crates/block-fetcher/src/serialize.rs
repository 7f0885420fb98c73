// Copyright 2024-, Semiotic AI, Inc.
// SPDX-License-Identifier: Apache-2.0

use serde::Deserialize;
use ssz::{Decode, Encode};
use tracing::debug;
use types::{
    FullPayload, MainnetEthSpec, SignedBeaconBlock, SignedBeaconBlockAltair, SignedBeaconBlockBase,
    SignedBeaconBlockBellatrix, SignedBeaconBlockCapella, SignedBeaconBlockDeneb,
    SignedBeaconBlockElectra, SignedBeaconBlockFulu,
};

use crate::{
    encoding::Encoding,
    error::EncodingError,
    fork::Fork,
    source::{BlockPayload, VersionedBlock},
};

type Payload = FullPayload<MainnetEthSpec>;

/// Signed beacon block of any supported fork, mainnet preset.
pub type SignedBlock = SignedBeaconBlock<MainnetEthSpec>;

/// Serializes a fetched block in the requested encoding.
///
/// Consensus blocks are decoded into the [`SignedBlock`] variant of the fork
/// named by the block's version and serialized again from the typed value.
/// Execution blocks are written as header JSON followed by body JSON. An
/// unknown version, a payload fetched in another encoding, or a payload that
/// does not decode as its fork's block is an [`EncodingError`].
pub fn encode_block(block: &VersionedBlock, encoding: Encoding) -> Result<Vec<u8>, EncodingError> {
    match (encoding, &block.payload) {
        (Encoding::Json, BlockPayload::Json(value)) => {
            let signed_block = decode_json(block.version.parse()?, value)?;
            Ok(serde_json::to_vec(&signed_block)?)
        }
        (Encoding::Ssz, BlockPayload::Ssz(bytes)) => {
            let signed_block = decode_ssz(block.version.parse()?, bytes)?;
            debug!(slot = %signed_block.slot(), bytes = bytes.len(), "ssz block decoded");
            Ok(signed_block.as_ssz_bytes())
        }
        (Encoding::Json, BlockPayload::Execution { header, body }) => {
            encode_execution(header, body)
        }
        (expected, payload) => Err(EncodingError::PayloadMismatch {
            expected,
            found: payload.encoding(),
        }),
    }
}

/// Decodes a signed block from its beacon API JSON representation.
pub fn decode_json(fork: Fork, value: &serde_json::Value) -> Result<SignedBlock, EncodingError> {
    let signed_block = match fork {
        Fork::Phase0 => SignedBeaconBlock::Base(
            SignedBeaconBlockBase::<MainnetEthSpec, Payload>::deserialize(value)?,
        ),
        Fork::Altair => SignedBeaconBlock::Altair(
            SignedBeaconBlockAltair::<MainnetEthSpec, Payload>::deserialize(value)?,
        ),
        Fork::Bellatrix => SignedBeaconBlock::Bellatrix(
            SignedBeaconBlockBellatrix::<MainnetEthSpec, Payload>::deserialize(value)?,
        ),
        Fork::Capella => SignedBeaconBlock::Capella(
            SignedBeaconBlockCapella::<MainnetEthSpec, Payload>::deserialize(value)?,
        ),
        Fork::Deneb => SignedBeaconBlock::Deneb(
            SignedBeaconBlockDeneb::<MainnetEthSpec, Payload>::deserialize(value)?,
        ),
        Fork::Electra => SignedBeaconBlock::Electra(
            SignedBeaconBlockElectra::<MainnetEthSpec, Payload>::deserialize(value)?,
        ),
        Fork::Fulu => SignedBeaconBlock::Fulu(
            SignedBeaconBlockFulu::<MainnetEthSpec, Payload>::deserialize(value)?,
        ),
    };
    Ok(signed_block)
}

/// Decodes a signed block from its SSZ serialization.
pub fn decode_ssz(fork: Fork, bytes: &[u8]) -> Result<SignedBlock, EncodingError> {
    let signed_block = match fork {
        Fork::Phase0 => SignedBeaconBlock::Base(
            SignedBeaconBlockBase::<MainnetEthSpec, Payload>::from_ssz_bytes(bytes)
                .map_err(ssz_error)?,
        ),
        Fork::Altair => SignedBeaconBlock::Altair(
            SignedBeaconBlockAltair::<MainnetEthSpec, Payload>::from_ssz_bytes(bytes)
                .map_err(ssz_error)?,
        ),
        Fork::Bellatrix => SignedBeaconBlock::Bellatrix(
            SignedBeaconBlockBellatrix::<MainnetEthSpec, Payload>::from_ssz_bytes(bytes)
                .map_err(ssz_error)?,
        ),
        Fork::Capella => SignedBeaconBlock::Capella(
            SignedBeaconBlockCapella::<MainnetEthSpec, Payload>::from_ssz_bytes(bytes)
                .map_err(ssz_error)?,
        ),
        Fork::Deneb => SignedBeaconBlock::Deneb(
            SignedBeaconBlockDeneb::<MainnetEthSpec, Payload>::from_ssz_bytes(bytes)
                .map_err(ssz_error)?,
        ),
        Fork::Electra => SignedBeaconBlock::Electra(
            SignedBeaconBlockElectra::<MainnetEthSpec, Payload>::from_ssz_bytes(bytes)
                .map_err(ssz_error)?,
        ),
        Fork::Fulu => SignedBeaconBlock::Fulu(
            SignedBeaconBlockFulu::<MainnetEthSpec, Payload>::from_ssz_bytes(bytes)
                .map_err(ssz_error)?,
        ),
    };
    Ok(signed_block)
}

fn encode_execution(
    header: &serde_json::Value,
    body: &serde_json::Value,
) -> Result<Vec<u8>, EncodingError> {
    if header.get("hash").is_none() {
        return Err(EncodingError::MissingField("hash".to_string()));
    }
    let mut bytes = serde_json::to_vec(header)?;
    bytes.extend(serde_json::to_vec(body)?);
    Ok(bytes)
}

fn ssz_error(error: ssz::DecodeError) -> EncodingError {
    EncodingError::Ssz(format!("{error:?}"))
}
