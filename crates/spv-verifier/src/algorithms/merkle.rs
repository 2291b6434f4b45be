//! # Merkle Branch Computation
//!
//! Recomputes a block's merkle root from one transaction hash, its leaf
//! position, and the sibling hashes along its path. The combine step is the
//! chain's double-SHA-256.
//!
//! There is deliberately no structural check on sibling contents. An old
//! "does this inner node look like a transaction" heuristic guarded against
//! a leaf/inner-node ambiguity attack; the chain's minimum transaction size
//! has since made that attack impossible and the heuristic would now reject
//! valid proofs.

use crate::domain::{Hash, SpvError};
use sha2::{Digest, Sha256};

/// Maximum number of levels in a merkle branch. The leaf position carries
/// one bit per level, so a deeper branch cannot describe a real block.
pub const MAX_BRANCH_DEPTH: usize = 64;

/// Double-SHA-256 of the concatenation of two nodes.
fn sha256d(left: &Hash, right: &Hash) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(left);
    hasher.update(right);
    let inner = hasher.finalize();
    let outer = Sha256::digest(inner);
    let mut output = [0u8; 32];
    output.copy_from_slice(&outer);
    output
}

/// Decode a hex hash string from display byte order into internal order.
///
/// # Errors
/// `MalformedProof` if the string is not valid hex or not 32 bytes.
pub fn decode_hash(s: &str) -> Result<Hash, SpvError> {
    let bytes =
        hex::decode(s).map_err(|e| SpvError::MalformedProof(format!("bad hex hash: {e}")))?;
    if bytes.len() != 32 {
        return Err(SpvError::MalformedProof(format!(
            "hash is {} bytes, expected 32",
            bytes.len()
        )));
    }
    let mut output = [0u8; 32];
    for (out, byte) in output.iter_mut().zip(bytes.iter().rev()) {
        *out = *byte;
    }
    Ok(output)
}

/// Encode a hash into the hex display byte order used on the wire and in
/// logs.
pub fn encode_hash(hash: &Hash) -> String {
    let mut reversed = *hash;
    reversed.reverse();
    hex::encode(reversed)
}

/// Compute the merkle root implied by a branch.
///
/// Starting from the leaf, each sibling at level `i` is combined according
/// to bit `i` of `pos`: bit set means the current node is the right child
/// (`sha256d(sibling || h)`), bit clear means it is the left child
/// (`sha256d(h || sibling)`). With no siblings the leaf itself is the root.
///
/// # Errors
/// `MalformedProof` if the branch is deeper than [`MAX_BRANCH_DEPTH`].
pub fn compute_merkle_root(branch: &[Hash], leaf: Hash, pos: u64) -> Result<Hash, SpvError> {
    if branch.len() > MAX_BRANCH_DEPTH {
        return Err(SpvError::MalformedProof(format!(
            "branch has {} levels, maximum is {}",
            branch.len(),
            MAX_BRANCH_DEPTH
        )));
    }

    let mut h = leaf;
    for (i, sibling) in branch.iter().enumerate() {
        h = if (pos >> i) & 1 == 1 {
            sha256d(sibling, &h)
        } else {
            sha256d(&h, sibling)
        };
    }
    Ok(h)
}

/// Compute the merkle root straight from a wire-format branch: hex sibling
/// hashes, hex transaction hash, and the raw (possibly hostile) position.
///
/// # Errors
/// `MalformedProof` on any undecodable hash, a negative position, or an
/// oversized branch.
pub fn branch_root(merkle: &[String], tx_hash: &str, pos: i64) -> Result<Hash, SpvError> {
    if pos < 0 {
        return Err(SpvError::MalformedProof(format!(
            "negative leaf position {pos}"
        )));
    }
    let leaf = decode_hash(tx_hash)?;
    let branch = merkle
        .iter()
        .map(|s| decode_hash(s))
        .collect::<Result<Vec<Hash>, SpvError>>()?;
    compute_merkle_root(&branch, leaf, pos as u64)
}
