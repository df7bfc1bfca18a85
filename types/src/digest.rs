//! 32-byte digests identifying the proposal and the block a vote endorses.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! digest_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
        pub struct $name([u8; 32]);

        impl $name {
            pub const ZERO: Self = Self([0u8; 32]);

            pub fn new(bytes: [u8; 32]) -> Self {
                Self(bytes)
            }

            pub fn as_bytes(&self) -> &[u8; 32] {
                &self.0
            }

            pub fn is_zero(&self) -> bool {
                self.0 == [0u8; 32]
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({}\u{2026})", stringify!($name), hex::encode(&self.0[..4]))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&hex::encode(self.0))
            }
        }

        impl From<[u8; 32]> for $name {
            fn from(bytes: [u8; 32]) -> Self {
                Self(bytes)
            }
        }
    };
}

digest_type!(
    /// Hash of the proposal (ordered transaction set) a round votes on.
    ProposalHash
);

digest_type!(
    /// Hash of the block built from the proposal.
    BlockHash
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_digest() {
        assert!(BlockHash::ZERO.is_zero());
        assert!(!ProposalHash::new([1; 32]).is_zero());
        assert_eq!(BlockHash::default(), BlockHash::ZERO);
    }

    #[test]
    fn display_is_full_hex() {
        let h = BlockHash::new([0xab; 32]);
        assert_eq!(h.to_string(), "ab".repeat(32));
    }

    #[test]
    fn debug_is_abbreviated() {
        let h = ProposalHash::new([0x01; 32]);
        assert_eq!(format!("{h:?}"), "ProposalHash(01010101\u{2026})");
    }
}
