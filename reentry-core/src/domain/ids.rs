use serde::{Deserialize, Serialize};
use std::fmt;

/// Content hash of a raw input file (BLAKE3, hex).
///
/// Printed in reports so that a report can be traced back to the exact
/// trade export it was generated from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatasetHash(pub String);

impl DatasetHash {
    pub fn of_bytes(bytes: &[u8]) -> Self {
        Self(blake3::hash(bytes).to_hex().to_string())
    }

    /// First 12 hex characters, enough to tell two exports apart in a table.
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(12)]
    }
}

impl fmt::Display for DatasetHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_bytes_same_hash() {
        let a = DatasetHash::of_bytes(b"TradeId,EntryTime\n1,2024-01-01 00:00\n");
        let b = DatasetHash::of_bytes(b"TradeId,EntryTime\n1,2024-01-01 00:00\n");
        assert_eq!(a, b);
        assert_eq!(a.0.len(), 64);
    }

    #[test]
    fn different_bytes_different_hash() {
        let a = DatasetHash::of_bytes(b"a");
        let b = DatasetHash::of_bytes(b"b");
        assert_ne!(a, b);
    }

    #[test]
    fn short_is_prefix() {
        let h = DatasetHash::of_bytes(b"trades");
        assert_eq!(h.short().len(), 12);
        assert!(h.0.starts_with(h.short()));
    }
}
