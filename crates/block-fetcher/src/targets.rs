// Copyright 2024-, Semiotic AI, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::{io::Read, path::Path};

use crate::{error::RetrieverError, source::BlockId};

/// Column of the block list holding the block identifier.
const BLOCK_ID_COLUMN: usize = 0;

/// Reads the identifiers of the blocks to fetch from a CSV file.
///
/// The first row is a header. Every following row contributes the identifier
/// in its first column; rows with an empty first column are skipped. An
/// identifier holding a path separator or `..` fails the whole list with
/// [`RetrieverError::InvalidBlockId`], since it ends up in a file name.
pub fn read_target_blocks(path: impl AsRef<Path>) -> Result<Vec<BlockId>, RetrieverError> {
    let reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;
    collect_block_ids(reader)
}

/// Same as [`read_target_blocks`], over any reader.
pub fn read_target_blocks_from_reader<R: Read>(reader: R) -> Result<Vec<BlockId>, RetrieverError> {
    let reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);
    collect_block_ids(reader)
}

fn collect_block_ids<R: Read>(mut reader: csv::Reader<R>) -> Result<Vec<BlockId>, RetrieverError> {
    let mut ids = Vec::new();
    for record in reader.records() {
        let record = record?;
        match record.get(BLOCK_ID_COLUMN).map(str::trim) {
            Some(id) if id.is_empty() => continue,
            Some(id) if escapes_folder(id) => {
                return Err(RetrieverError::InvalidBlockId(id.to_string()))
            }
            Some(id) => ids.push(BlockId::new(id)),
            None => continue,
        }
    }
    Ok(ids)
}

fn escapes_folder(id: &str) -> bool {
    id.contains(['/', '\\']) || id.contains("..")
}
