//! Core wallet functionality
//!
//! This module contains key material handling, the secret candidate source,
//! keystore management and the account key retrieval protocol.

pub mod crypto;
pub mod secrets;
pub mod storage;
pub mod retrieval;
