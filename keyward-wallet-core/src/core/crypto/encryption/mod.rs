//! Encryption of keystore secrets at rest

pub mod envelope;

pub use envelope::*;
