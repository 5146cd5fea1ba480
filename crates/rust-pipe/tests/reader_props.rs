//! Property tests for chunked reads and environment edits.

#![cfg(unix)]

use std::collections::HashMap;
use std::ffi::OsString;

use proptest::prelude::*;
use rust_pipe::{PipeConfig, Readable, StreamReader};
use tokio::io::AsyncWriteExt;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("runtime")
}

/// Write `writes` into a duplex pipe, then read it back `max` bytes at a time.
async fn reassemble(writes: Vec<Vec<u8>>, max: usize) -> (Vec<u8>, Vec<usize>) {
    let (ours, mut theirs) = tokio::io::duplex(1 << 20);
    let mut reader = StreamReader::new("prop", Box::new(ours));
    for write in &writes {
        theirs.write_all(write).await.expect("write");
    }
    drop(theirs);

    let mut data = Vec::new();
    let mut sizes = Vec::new();
    loop {
        let (chunk, eof) = reader.read_chunk(max).await.expect("read");
        if eof {
            assert!(chunk.is_empty());
            break;
        }
        sizes.push(chunk.len());
        data.extend_from_slice(&chunk);
    }
    assert!(reader.is_eof());
    (data, sizes)
}

proptest! {
    #[test]
    fn chunks_reassemble_in_order(
        writes in prop::collection::vec(prop::collection::vec(any::<u8>(), 1..512), 0..16),
        max in 1_usize..700,
    ) {
        let expected: Vec<u8> = writes.concat();
        let (data, sizes) = runtime().block_on(reassemble(writes, max));
        prop_assert_eq!(data, expected);
        prop_assert!(sizes.iter().all(|&n| n > 0 && n <= max));
    }

    #[test]
    fn last_edit_to_a_key_wins(edits in prop::collection::vec(("[A-C]", prop::option::of("[a-z]{1,4}")), 0..12)) {
        let mut builder = PipeConfig::builder().env_clear();
        let mut expected = HashMap::new();
        for (key, value) in &edits {
            builder = match value {
                Some(value) => {
                    expected.insert(OsString::from(key), OsString::from(value));
                    builder.env(key, value)
                }
                None => {
                    expected.remove(&OsString::from(key));
                    builder.env_remove(key)
                }
            };
        }
        prop_assert_eq!(builder.build().effective_env(), expected);
    }
}
