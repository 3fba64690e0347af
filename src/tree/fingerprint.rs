//! Structural fingerprints of subtrees
//!
//! Two nodes share a fingerprint when their subtrees cannot be told apart:
//! same token, same terminal flag, same score (terminal nodes only) and
//! children with pairwise equal tokens and fingerprints. Counts and node
//! identities never enter the digest.

use sha2::{Digest, Sha256};
use std::fmt;

use super::node::{Node, Token};

/// SHA-256 digest of a subtree's canonical encoding
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// Digest a node given its children's fingerprints in ascending token order.
    ///
    /// Encoding: token, terminal byte, optional score (terminal only),
    /// child count, then `(token, fingerprint)` per child.
    pub(crate) fn of(node: &Node, children: &[Fingerprint]) -> Self {
        debug_assert_eq!(node.children.len(), children.len());

        let mut hasher = Sha256::new();
        encode_token(&mut hasher, node.token);
        hasher.update([u8::from(node.terminal)]);

        let score = if node.terminal { node.score } else { None };
        match score {
            Some(score) => {
                // -0.0 and 0.0 are the same score
                let score = if score == 0.0 { 0.0 } else { score };
                hasher.update([1u8]);
                hasher.update(score.to_bits().to_be_bytes());
            }
            None => hasher.update([0u8]),
        }

        hasher.update((children.len() as u64).to_be_bytes());
        for (token, fingerprint) in node.children.keys().zip(children) {
            encode_token(&mut hasher, *token);
            hasher.update(fingerprint.0);
        }

        Fingerprint(hasher.finalize().into())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// First 12 hex characters, enough to tell subtrees apart in output
    pub fn short(&self) -> String {
        let mut hex = self.to_string();
        hex.truncate(12);
        hex
    }
}

fn encode_token(hasher: &mut Sha256, token: Token) {
    match token {
        Token::Root => hasher.update([0u8]),
        Token::Id(id) => {
            hasher.update([1u8]);
            hasher.update(id.to_be_bytes());
        }
        Token::Unknown => hasher.update([2u8]),
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", self.short())
    }
}
