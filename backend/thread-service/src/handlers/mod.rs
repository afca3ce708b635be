/// HTTP handlers for thread-related endpoints
///
/// This module contains handlers for:
/// - Threads: create, paginate top-level, fetch with nested replies
/// - Comments: append a comment to an existing thread
pub mod threads;

// Re-export handler functions at module level
pub use threads::{add_comment, create_thread, get_thread, get_user_threads, list_threads};
