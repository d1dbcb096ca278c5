//! Cryptographic helpers for recon.
//!
//! Key material is an opaque capability handed in at startup. This crate only
//! turns it into signatures over batch digests; nothing here knows the wire
//! format of the remote ledger.

pub mod digest;
pub mod signer;

pub use digest::{BatchDigest, DigestError};
pub use signer::{KeyError, Signature, SigningKey, VerifyingKey};
