//! Core import pipeline.

pub mod coordinator;
pub mod enricher;
pub mod matcher;
pub mod normalizer;
pub mod resolution;
pub mod resolver;
