use rlist_domain::UriHash;
use sha2::{Digest, Sha256};

/// SHA-256 of the URI's UTF-8 bytes.
///
/// Indexers recompute this value off-line, so the algorithm is part of the public contract.
#[must_use]
pub fn uri_hash(uri: &str) -> UriHash {
    let digest = Sha256::digest(uri.as_bytes());
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&digest);
    UriHash::from_bytes(bytes)
}
