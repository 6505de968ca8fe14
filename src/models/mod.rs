//! Core data models for the file front-end.
//!
//! `FileRecord` is what the registry holds and what the HTTP surface
//! serializes; `ObjectSummary` is what the store hands back when listed.

pub mod file_record;
pub mod object;
