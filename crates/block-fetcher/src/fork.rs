// Copyright 2024-, Semiotic AI, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::{fmt, str::FromStr};

use types::ForkName;

use crate::error::EncodingError;

/// Consensus fork a beacon block was produced under.
///
/// A version tag outside this list is rejected with
/// [`EncodingError::UnsupportedVersion`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Fork {
    /// Genesis fork, `phase0`.
    Phase0,
    /// Sync committees.
    Altair,
    /// The merge, blocks carry an execution payload.
    Bellatrix,
    /// Withdrawals and BLS to execution changes.
    Capella,
    /// Blob KZG commitments.
    Deneb,
    /// Execution requests.
    Electra,
    /// PeerDAS; same block body as Electra.
    Fulu,
}

impl Fork {
    /// Every supported fork, oldest first.
    pub const ALL: [Fork; 7] = [
        Fork::Phase0,
        Fork::Altair,
        Fork::Bellatrix,
        Fork::Capella,
        Fork::Deneb,
        Fork::Electra,
        Fork::Fulu,
    ];

    /// Version tag as reported by the beacon API.
    pub fn name(self) -> &'static str {
        match self {
            Fork::Phase0 => "phase0",
            Fork::Altair => "altair",
            Fork::Bellatrix => "bellatrix",
            Fork::Capella => "capella",
            Fork::Deneb => "deneb",
            Fork::Electra => "electra",
            Fork::Fulu => "fulu",
        }
    }

    /// Matching consensus types fork.
    pub fn fork_name(self) -> ForkName {
        match self {
            Fork::Phase0 => ForkName::Base,
            Fork::Altair => ForkName::Altair,
            Fork::Bellatrix => ForkName::Bellatrix,
            Fork::Capella => ForkName::Capella,
            Fork::Deneb => ForkName::Deneb,
            Fork::Electra => ForkName::Electra,
            Fork::Fulu => ForkName::Fulu,
        }
    }
}

impl FromStr for Fork {
    type Err = EncodingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_ascii_lowercase();
        Fork::ALL
            .into_iter()
            .find(|fork| fork.name() == tag)
            .ok_or_else(|| EncodingError::UnsupportedVersion(s.to_string()))
    }
}

impl fmt::Display for Fork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_version_tags() {
        assert_eq!("deneb".parse::<Fork>().unwrap(), Fork::Deneb);
        assert_eq!("PHASE0".parse::<Fork>().unwrap(), Fork::Phase0);
        assert_eq!(" capella ".parse::<Fork>().unwrap(), Fork::Capella);
    }

    #[test]
    fn test_unknown_version_is_an_error() {
        let err = "verkle".parse::<Fork>().unwrap_err();
        assert!(matches!(err, EncodingError::UnsupportedVersion(tag) if tag == "verkle"));
    }

    #[test]
    fn test_fork_names_are_distinct_and_ordered() {
        for pair in Fork::ALL.windows(2) {
            assert!(pair[0].fork_name() < pair[1].fork_name());
        }
        assert_eq!(Fork::Phase0.fork_name(), ForkName::Base);
    }
}
