//! Core data models for the build

pub mod build;
pub mod manifest;

pub use build::*;
pub use manifest::*;
