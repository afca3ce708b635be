/// Business logic layer
pub mod threads;

pub use threads::ThreadService;
