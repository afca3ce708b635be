use crate::models::{Thread, ThreadWithAuthorRow};
use sqlx::{PgPool, Row};
use uuid::Uuid;

/// Insert a new thread. A `parent_id` of `None` creates a top-level thread;
/// `Some(id)` creates a comment on that thread.
/// Returns the created row.
pub async fn insert_thread(
    pool: &PgPool,
    author_id: Uuid,
    parent_id: Option<Uuid>,
    body: &str,
) -> Result<Thread, sqlx::Error> {
    let thread = sqlx::query_as::<_, Thread>(
        r#"
        INSERT INTO threads (author_id, parent_id, body)
        VALUES ($1, $2, $3)
        RETURNING id, author_id, parent_id, body, created_at
        "#,
    )
    .bind(author_id)
    .bind(parent_id)
    .bind(body)
    .fetch_one(pool)
    .await?;

    Ok(thread)
}

/// Find a thread by ID
pub async fn find_thread_by_id(pool: &PgPool, thread_id: Uuid) -> Result<Option<Thread>, sqlx::Error> {
    let thread = sqlx::query_as::<_, Thread>(
        r#"
        SELECT id, author_id, parent_id, body, created_at
        FROM threads
        WHERE id = $1
        "#,
    )
    .bind(thread_id)
    .fetch_optional(pool)
    .await?;

    Ok(thread)
}

/// Find a thread by ID with its author resolved
pub async fn find_thread_with_author(
    pool: &PgPool,
    thread_id: Uuid,
) -> Result<Option<ThreadWithAuthorRow>, sqlx::Error> {
    let row = sqlx::query_as::<_, ThreadWithAuthorRow>(
        r#"
        SELECT t.id, t.author_id, t.parent_id, t.body, t.created_at,
               u.name AS author_name, u.image_url AS author_image_url
        FROM threads t
        JOIN users u ON t.author_id = u.id
        WHERE t.id = $1
        "#,
    )
    .bind(thread_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Find top-level threads (no parent reference), newest first, with authors
pub async fn find_top_level_threads(
    pool: &PgPool,
    limit: i64,
    offset: i64,
) -> Result<Vec<ThreadWithAuthorRow>, sqlx::Error> {
    let rows = sqlx::query_as::<_, ThreadWithAuthorRow>(
        r#"
        SELECT t.id, t.author_id, t.parent_id, t.body, t.created_at,
               u.name AS author_name, u.image_url AS author_image_url
        FROM threads t
        JOIN users u ON t.author_id = u.id
        WHERE t.parent_id IS NULL
        ORDER BY t.created_at DESC
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Count total top-level threads
pub async fn count_top_level_threads(pool: &PgPool) -> Result<i64, sqlx::Error> {
    let row = sqlx::query("SELECT COUNT(*) as count FROM threads WHERE parent_id IS NULL")
        .fetch_one(pool)
        .await?;

    Ok(row.get::<i64, _>("count"))
}

/// Find direct replies to any of the given threads, oldest first, with
/// authors. Reply order matches insertion order, mirroring an append-only
/// children list.
pub async fn find_replies(
    pool: &PgPool,
    parent_ids: &[Uuid],
) -> Result<Vec<ThreadWithAuthorRow>, sqlx::Error> {
    let rows = sqlx::query_as::<_, ThreadWithAuthorRow>(
        r#"
        SELECT t.id, t.author_id, t.parent_id, t.body, t.created_at,
               u.name AS author_name, u.image_url AS author_image_url
        FROM threads t
        JOIN users u ON t.author_id = u.id
        WHERE t.parent_id = ANY($1)
        ORDER BY t.created_at ASC
        "#,
    )
    .bind(parent_ids)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Find all threads authored by a user, newest first.
/// The authored list is derived from author_id; nothing is stored on the user.
pub async fn find_threads_by_author(
    pool: &PgPool,
    author_id: Uuid,
    limit: i64,
    offset: i64,
) -> Result<Vec<Thread>, sqlx::Error> {
    let threads = sqlx::query_as::<_, Thread>(
        r#"
        SELECT id, author_id, parent_id, body, created_at
        FROM threads
        WHERE author_id = $1
        ORDER BY created_at DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(author_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(threads)
}
