// Copyright 2024-, Semiotic AI, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use clap::ValueEnum;

/// Wire encoding a block is requested in and stored as.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ValueEnum)]
pub enum Encoding {
    /// Beacon API JSON representation of the signed block.
    Json,
    /// SSZ serialization of the signed block.
    Ssz,
}

impl Encoding {
    /// File extension, metrics prefix and CLI spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            Encoding::Json => "json",
            Encoding::Ssz => "ssz",
        }
    }

    /// Value of the `Accept` header used when asking a beacon node for a block.
    pub fn media_type(self) -> &'static str {
        match self {
            Encoding::Json => "application/json",
            Encoding::Ssz => "application/octet-stream",
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
