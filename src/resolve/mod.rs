//! Resolution strategies and multi-edit splicing

pub mod engine;

pub use engine::{apply_all, resolve, Resolution, ResolutionType};
