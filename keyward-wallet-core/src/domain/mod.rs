//! Domain layer - capability model and account references

pub mod capabilities;
pub mod reference;

pub use capabilities::*;
pub use reference::*;
