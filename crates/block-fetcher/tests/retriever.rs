// Copyright 2024-, Semiotic AI, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::{cell::RefCell, collections::HashMap, fs};

use block_fetcher::{
    block_file_name, fetch_and_store, BlockId, BlockPayload, BlockSource, Encoding, FetchError,
    FetchOutcome, RetrieverError, VersionedBlock, EXECUTION_VERSION,
};
use serde_json::json;
use ssz::Encode;
use types::{
    BeaconBlock, ChainSpec, ForkName, MainnetEthSpec, Signature, SignedBeaconBlock, Slot,
};

enum Canned {
    Block(VersionedBlock),
    Missing,
    Unreachable,
}

/// In-memory block source that records the order of requests.
#[derive(Default)]
struct FakeSource {
    blocks: HashMap<BlockId, Canned>,
    requests: RefCell<Vec<BlockId>>,
}

impl FakeSource {
    fn with(mut self, id: u64, canned: Canned) -> Self {
        self.blocks.insert(BlockId::from(id), canned);
        self
    }
}

impl BlockSource for FakeSource {
    async fn fetch_block(
        &self,
        id: &BlockId,
        _encoding: Encoding,
    ) -> Result<Option<VersionedBlock>, FetchError> {
        self.requests.borrow_mut().push(id.clone());
        match self.blocks.get(id) {
            Some(Canned::Block(block)) => Ok(Some(block.clone())),
            Some(Canned::Missing) | None => Ok(None),
            Some(Canned::Unreachable) => Err(FetchError::Status {
                block_id: id.clone(),
                status: 503,
                message: "node is syncing".to_string(),
            }),
        }
    }
}

fn signed_block(fork: ForkName, slot: u64) -> SignedBeaconBlock<MainnetEthSpec> {
    let spec = fork.make_genesis_spec(ChainSpec::mainnet());
    let mut block = BeaconBlock::<MainnetEthSpec>::empty(&spec);
    *block.slot_mut() = Slot::new(slot);
    SignedBeaconBlock::from_block(block, Signature::empty())
}

fn deneb_json_block(slot: u64) -> VersionedBlock {
    VersionedBlock {
        id: BlockId::from(slot),
        version: "deneb".to_string(),
        payload: BlockPayload::Json(
            serde_json::to_value(signed_block(ForkName::Deneb, slot)).unwrap(),
        ),
    }
}

#[tokio::test]
async fn test_not_proposed_block_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let source = FakeSource::default()
        .with(100, Canned::Block(deneb_json_block(100)))
        .with(101, Canned::Missing)
        .with(102, Canned::Block(deneb_json_block(102)));
    let ids: Vec<BlockId> = [100, 101, 102].into_iter().map(BlockId::from).collect();

    let report = fetch_and_store(&source, &ids, Encoding::Json, dir.path())
        .await
        .unwrap();

    assert_eq!(report.stored(), 2);
    assert_eq!(report.not_proposed(), 1);
    assert_eq!(report.failed(), 0);
    assert!(matches!(report.outcomes[1].1, FetchOutcome::NotProposed));

    assert!(dir.path().join("block_100.json").exists());
    assert!(!dir.path().join("block_101.json").exists());
    assert!(dir.path().join("block_102.json").exists());

    // requests go out one by one, in the order of the list
    assert_eq!(*source.requests.borrow(), ids);
}

#[tokio::test]
async fn test_failures_do_not_abort_the_batch() {
    let dir = tempfile::tempdir().unwrap();
    let mut unknown_fork = deneb_json_block(2);
    unknown_fork.version = "verkle".to_string();

    let source = FakeSource::default()
        .with(1, Canned::Unreachable)
        .with(2, Canned::Block(unknown_fork))
        .with(3, Canned::Block(deneb_json_block(3)));
    let ids: Vec<BlockId> = [1, 2, 3].into_iter().map(BlockId::from).collect();

    let report = fetch_and_store(&source, &ids, Encoding::Json, dir.path())
        .await
        .unwrap();

    assert!(matches!(
        report.outcomes[0].1,
        FetchOutcome::Failed(RetrieverError::Fetch(FetchError::Status { status: 503, .. }))
    ));
    assert!(matches!(
        report.outcomes[1].1,
        FetchOutcome::Failed(RetrieverError::Encoding(_))
    ));
    assert!(matches!(report.outcomes[2].1, FetchOutcome::Stored { .. }));

    let files: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(files.len(), 1);
}

#[tokio::test]
async fn test_stored_json_is_the_signed_block() {
    let dir = tempfile::tempdir().unwrap();
    let block = deneb_json_block(7);
    let source = FakeSource::default().with(7, Canned::Block(block.clone()));

    let report = fetch_and_store(&source, &[BlockId::from(7)], Encoding::Json, dir.path())
        .await
        .unwrap();

    let FetchOutcome::Stored { path, bytes } = &report.outcomes[0].1 else {
        panic!("block 7 was not stored: {:?}", report.outcomes[0].1);
    };
    assert_eq!(
        path,
        &dir.path().join(block_file_name(&BlockId::from(7), Encoding::Json))
    );

    let written = fs::read(path).unwrap();
    assert_eq!(written.len(), *bytes);
    let BlockPayload::Json(expected) = block.payload else {
        unreachable!()
    };
    assert_eq!(
        serde_json::from_slice::<serde_json::Value>(&written).unwrap(),
        expected
    );
}

#[tokio::test]
async fn test_output_folder_is_created() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("raw-blocks").join("deneb");
    let source = FakeSource::default();

    let report = fetch_and_store(&source, &[], Encoding::Ssz, &output)
        .await
        .unwrap();

    assert!(report.outcomes.is_empty());
    assert!(output.is_dir());
}

#[tokio::test]
async fn test_stored_ssz_is_the_signed_block() {
    let dir = tempfile::tempdir().unwrap();
    let bytes = signed_block(ForkName::Electra, 11).as_ssz_bytes();
    let block = VersionedBlock {
        id: BlockId::from(11),
        version: "electra".to_string(),
        payload: BlockPayload::Ssz(bytes.clone()),
    };
    let source = FakeSource::default().with(11, Canned::Block(block));

    fetch_and_store(&source, &[BlockId::from(11)], Encoding::Ssz, dir.path())
        .await
        .unwrap();

    assert_eq!(fs::read(dir.path().join("block_11.ssz")).unwrap(), bytes);
}

#[tokio::test]
async fn test_execution_block_is_stored_as_header_then_body() {
    let dir = tempfile::tempdir().unwrap();
    let block = VersionedBlock {
        id: BlockId::from(5671744),
        version: EXECUTION_VERSION.to_string(),
        payload: BlockPayload::Execution {
            header: json!({"hash": "0x01", "number": "0x568b40"}),
            body: json!({"transactions": [], "uncles": []}),
        },
    };
    let source = FakeSource::default().with(5671744, Canned::Block(block));

    let report = fetch_and_store(&source, &[BlockId::from(5671744)], Encoding::Json, dir.path())
        .await
        .unwrap();

    assert_eq!(report.stored(), 1);
    let written = fs::read_to_string(dir.path().join("block_5671744.json")).unwrap();
    insta::assert_snapshot!(
        written,
        @r#"{"hash":"0x01","number":"0x568b40"}{"transactions":[],"uncles":[]}"#
    );
}
