/// Thread Service Library
///
/// Handles thread (post) and comment data access for the social-posting
/// application: creating threads, paginating top-level threads, fetching a
/// thread with its nested replies, and appending comments. Successful
/// mutations notify the rendering layer through path revalidation.
///
/// # Modules
///
/// - `handlers`: Thread-related HTTP request handlers
/// - `models`: Data structures for threads and author projections
/// - `services`: Business logic layer
/// - `db`: Database access layer and repositories
/// - `error`: Error types and handling
/// - `config`: Configuration management
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::{AppError, Result};
