//! Domain types and pure algorithms for video annotation: frame keys, pose
//! and object records, rule-based action classification, segment
//! consolidation, extraction lifecycle and export rendering.

pub mod classifier;
pub mod error;
pub mod export;
pub mod extraction;
pub mod frame;
pub mod movement;
pub mod pose;
pub mod segment;
pub mod summary;
pub mod types;
