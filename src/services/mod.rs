//! External service clients and their seams.

pub mod omdb;
pub mod provider;
pub mod tmdb;
