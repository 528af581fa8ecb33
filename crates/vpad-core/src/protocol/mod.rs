//! Protocol module containing the JSON snapshot codec.

pub mod codec;

pub use codec::{decode_snapshot, decode_snapshot_bytes, encode_snapshot, SnapshotError};
