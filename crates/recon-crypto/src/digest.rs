use recon_types::Operation;

const BATCH_DOMAIN: &str = "recon-batch-v1";

/// Domain-separated BLAKE3 digest of an operation batch.
///
/// The digest covers the canonical JSON encoding of the operations in order,
/// so reordering a batch changes it.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct BatchDigest([u8; 32]);

impl BatchDigest {
    pub fn of_operations(operations: &[Operation]) -> Result<Self, DigestError> {
        let encoded =
            serde_json::to_vec(operations).map_err(|e| DigestError::Serialization(e.to_string()))?;
        Ok(Self::of_bytes(&encoded))
    }

    pub fn of_bytes(data: &[u8]) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(BATCH_DOMAIN.as_bytes());
        hasher.update(b":");
        hasher.update(data);
        Self(*hasher.finalize().as_bytes())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl std::fmt::Debug for BatchDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BatchDigest({})", hex::encode(&self.0[..4]))
    }
}

/// Errors from digest computation.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DigestError {
    #[error("serialization error: {0}")]
    Serialization(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use recon_types::{AccountName, Amount, Asset};

    fn transfer(to: &str) -> Operation {
        Operation::Transfer {
            from: AccountName::from("eosio"),
            to: AccountName::from(to),
            quantity: Asset::new(Amount::from_units(1), "EOS"),
            memo: String::new(),
        }
    }

    #[test]
    fn digest_is_deterministic() {
        let ops = vec![transfer("alice"), transfer("bob")];
        assert_eq!(
            BatchDigest::of_operations(&ops).unwrap(),
            BatchDigest::of_operations(&ops).unwrap()
        );
    }

    #[test]
    fn order_changes_digest() {
        let a = BatchDigest::of_operations(&[transfer("alice"), transfer("bob")]).unwrap();
        let b = BatchDigest::of_operations(&[transfer("bob"), transfer("alice")]).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn domain_separated_from_raw_hash() {
        let data = b"payload";
        assert_ne!(BatchDigest::of_bytes(data).as_bytes(), blake3::hash(data).as_bytes());
    }

    #[test]
    fn hex_is_64_chars() {
        assert_eq!(BatchDigest::of_bytes(b"x").to_hex().len(), 64);
    }
}
