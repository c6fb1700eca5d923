//! Catalog Importer Library
//!
//! Bulk-import pipeline for a personal media catalog: resolves user-supplied
//! CSV rows against TMDB, enriches confident matches and persists them, and
//! holds everything else for human-in-the-loop resolution.

pub mod cli;
pub mod core;
pub mod db;
pub mod error;
pub mod models;
pub mod services;

pub use error::{Error, Result};
