/// Thread service - creating threads, paginating top-level threads, fetching
/// a thread with nested replies, and appending comments
use crate::db::thread_repo;
use crate::error::{AppError, Result};
use crate::models::{
    ReplyView, Thread, ThreadDetail, ThreadPage, ThreadReply, ThreadSummary, ThreadWithAuthorRow,
};
use cache_revalidation::RevalidationPublisher;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

pub struct ThreadService {
    pool: PgPool,
    revalidator: Option<Arc<RevalidationPublisher>>,
}

impl ThreadService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            revalidator: None,
        }
    }

    pub fn with_revalidation(pool: PgPool, revalidator: Arc<RevalidationPublisher>) -> Self {
        Self {
            pool,
            revalidator: Some(revalidator),
        }
    }

    /// Notify the rendering layer that content at `path` is stale. The write
    /// has already committed, so a failed publish is logged and swallowed.
    async fn revalidate(&self, path: &str) {
        if let Some(revalidator) = &self.revalidator {
            if let Err(err) = revalidator.revalidate_path(path).await {
                tracing::warn!(%path, "revalidation publish failed: {}", err);
            }
        }
    }

    /// Create a new top-level thread and revalidate `path`.
    ///
    /// The author's thread list is derived from author_id, so the insert is
    /// the only write. A nonexistent author surfaces as the same generic
    /// store failure as any other (foreign key violation).
    pub async fn create_thread(&self, author_id: Uuid, body: &str, path: &str) -> Result<Thread> {
        let thread = thread_repo::insert_thread(&self.pool, author_id, None, body)
            .await
            .map_err(|e| AppError::DatabaseError(format!("error creating thread: {}", e)))?;

        self.revalidate(path).await;

        Ok(thread)
    }

    /// List one page of top-level threads, newest first, each with its
    /// author and direct replies (replies are not recursively expanded).
    pub async fn list_threads(&self, page_number: u32, page_size: u32) -> Result<ThreadPage> {
        let page_number = page_number.max(1);
        let offset = (page_number as i64 - 1) * page_size as i64;

        let rows =
            thread_repo::find_top_level_threads(&self.pool, page_size as i64, offset).await?;
        let total = thread_repo::count_top_level_threads(&self.pool).await?;

        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let mut replies_by_parent = group_by_parent(if ids.is_empty() {
            Vec::new()
        } else {
            thread_repo::find_replies(&self.pool, &ids).await?
        });

        let threads = rows
            .into_iter()
            .map(|row| {
                let author = row.author();
                let replies = replies_by_parent
                    .remove(&row.id)
                    .unwrap_or_default()
                    .into_iter()
                    .map(ReplyView::from)
                    .collect();
                ThreadSummary {
                    id: row.id,
                    body: row.body,
                    created_at: row.created_at,
                    author,
                    replies,
                }
            })
            .collect::<Vec<_>>();

        let has_next = total > offset + threads.len() as i64;

        Ok(ThreadPage { threads, has_next })
    }

    /// Fetch a single thread with exactly two levels of replies expanded.
    /// An unknown id yields `Ok(None)`, not an error.
    pub async fn get_thread(&self, thread_id: Uuid) -> Result<Option<ThreadDetail>> {
        let row = thread_repo::find_thread_with_author(&self.pool, thread_id)
            .await
            .map_err(|e| AppError::DatabaseError(format!("error fetching thread: {}", e)))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let children = thread_repo::find_replies(&self.pool, &[thread_id])
            .await
            .map_err(|e| AppError::DatabaseError(format!("error fetching thread: {}", e)))?;

        let child_ids: Vec<Uuid> = children.iter().map(|c| c.id).collect();
        let grandchildren = if child_ids.is_empty() {
            Vec::new()
        } else {
            thread_repo::find_replies(&self.pool, &child_ids)
                .await
                .map_err(|e| AppError::DatabaseError(format!("error fetching thread: {}", e)))?
        };

        // Second-level replies keep empty reply lists; deeper levels are not
        // expanded.
        let mut grandchildren_by_parent = group_by_parent(grandchildren);

        let replies = children
            .into_iter()
            .map(|child| {
                let nested = grandchildren_by_parent
                    .remove(&child.id)
                    .unwrap_or_default()
                    .into_iter()
                    .map(|gc| reply_node(gc, Vec::new()))
                    .collect();
                reply_node(child, nested)
            })
            .collect();

        let author = row.author();
        Ok(Some(ThreadDetail {
            id: row.id,
            parent_id: row.parent_id,
            body: row.body,
            created_at: row.created_at,
            author,
            replies,
        }))
    }

    /// Append a comment to an existing thread and revalidate `path`.
    ///
    /// The parent linkage lives in the comment's parent_id, so the insert is
    /// the only write; the parent's children are derived by query.
    pub async fn add_comment(
        &self,
        thread_id: Uuid,
        author_id: Uuid,
        body: &str,
        path: &str,
    ) -> Result<Thread> {
        let original = thread_repo::find_thread_by_id(&self.pool, thread_id)
            .await
            .map_err(|e| {
                AppError::DatabaseError(format!("error adding comment to thread: {}", e))
            })?;

        if original.is_none() {
            return Err(AppError::NotFound("thread not found".to_string()));
        }

        let comment = thread_repo::insert_thread(&self.pool, author_id, Some(thread_id), body)
            .await
            .map_err(|e| {
                AppError::DatabaseError(format!("error adding comment to thread: {}", e))
            })?;

        self.revalidate(path).await;

        Ok(comment)
    }

    /// List threads authored by a user, newest first (derived list; nothing
    /// is stored on the user record).
    pub async fn list_user_threads(
        &self,
        author_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Thread>> {
        let threads =
            thread_repo::find_threads_by_author(&self.pool, author_id, limit, offset).await?;
        Ok(threads)
    }
}

fn group_by_parent(rows: Vec<ThreadWithAuthorRow>) -> HashMap<Uuid, Vec<ThreadWithAuthorRow>> {
    let mut by_parent: HashMap<Uuid, Vec<ThreadWithAuthorRow>> = HashMap::new();
    for row in rows {
        if let Some(parent_id) = row.parent_id {
            by_parent.entry(parent_id).or_default().push(row);
        }
    }
    by_parent
}

fn reply_node(row: ThreadWithAuthorRow, replies: Vec<ThreadReply>) -> ThreadReply {
    let author = row.author();
    ThreadReply {
        id: row.id,
        parent_id: row.parent_id,
        body: row.body,
        created_at: row.created_at,
        author,
        replies,
    }
}
