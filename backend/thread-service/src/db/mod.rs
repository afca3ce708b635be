/// Database access layer
///
/// Repository functions are flat async wrappers over `&PgPool` returning
/// `Result<_, sqlx::Error>`; error translation belongs to the service layer.
pub mod thread_repo;
