//! # Algorithms Module
//!
//! Pure merkle-branch computation for SPV proofs.

pub mod merkle;

pub use merkle::{branch_root, compute_merkle_root, decode_hash, encode_hash, MAX_BRANCH_DEPTH};
