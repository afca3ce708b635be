/// Data models for thread-service
///
/// A `Thread` is a user-authored text record. A thread with no parent is a
/// top-level post; a thread whose `parent_id` is set is a comment on that
/// parent. The state is fixed at creation and never changes.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A single threads-table row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Thread {
    pub id: Uuid,
    pub author_id: Uuid,
    /// Set iff this thread is a comment on another thread
    pub parent_id: Option<Uuid>,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl Thread {
    /// Whether this thread is a top-level post (no parent reference)
    pub fn is_top_level(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Restricted author projection resolved alongside threads
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorSummary {
    pub id: Uuid,
    pub name: String,
    pub image_url: Option<String>,
}

/// Flat row for a thread joined with its author
#[derive(Debug, Clone, FromRow)]
pub struct ThreadWithAuthorRow {
    pub id: Uuid,
    pub author_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub author_name: String,
    pub author_image_url: Option<String>,
}

impl ThreadWithAuthorRow {
    pub fn author(&self) -> AuthorSummary {
        AuthorSummary {
            id: self.author_id,
            name: self.author_name.clone(),
            image_url: self.author_image_url.clone(),
        }
    }
}

/// A direct reply as shown in listings (not recursively expanded)
#[derive(Debug, Clone, Serialize)]
pub struct ReplyView {
    pub id: Uuid,
    pub parent_id: Option<Uuid>,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub author: AuthorSummary,
}

impl From<ThreadWithAuthorRow> for ReplyView {
    fn from(row: ThreadWithAuthorRow) -> Self {
        let author = row.author();
        ReplyView {
            id: row.id,
            parent_id: row.parent_id,
            body: row.body,
            created_at: row.created_at,
            author,
        }
    }
}

/// A top-level thread in a listing page, with its direct replies
#[derive(Debug, Clone, Serialize)]
pub struct ThreadSummary {
    pub id: Uuid,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub author: AuthorSummary,
    pub replies: Vec<ReplyView>,
}

/// One page of top-level threads
#[derive(Debug, Clone, Serialize)]
pub struct ThreadPage {
    pub threads: Vec<ThreadSummary>,
    /// Whether more pages remain after this one
    pub has_next: bool,
}

/// A reply within a fetched thread; nested one level deeper at most
#[derive(Debug, Clone, Serialize)]
pub struct ThreadReply {
    pub id: Uuid,
    pub parent_id: Option<Uuid>,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub author: AuthorSummary,
    /// Replies to this reply; empty at the second nesting level even when
    /// deeper replies exist (they are not expanded)
    pub replies: Vec<ThreadReply>,
}

/// A single thread with exactly two levels of replies expanded
#[derive(Debug, Clone, Serialize)]
pub struct ThreadDetail {
    pub id: Uuid,
    pub parent_id: Option<Uuid>,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub author: AuthorSummary,
    pub replies: Vec<ThreadReply>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(parent_id: Option<Uuid>) -> ThreadWithAuthorRow {
        ThreadWithAuthorRow {
            id: Uuid::new_v4(),
            author_id: Uuid::new_v4(),
            parent_id,
            body: "hello".to_string(),
            created_at: Utc::now(),
            author_name: "alice".to_string(),
            author_image_url: None,
        }
    }

    #[test]
    fn test_top_level_is_determined_by_parent() {
        let top = Thread {
            id: Uuid::new_v4(),
            author_id: Uuid::new_v4(),
            parent_id: None,
            body: "post".to_string(),
            created_at: Utc::now(),
        };
        assert!(top.is_top_level());

        let comment = Thread {
            parent_id: Some(Uuid::new_v4()),
            ..top.clone()
        };
        assert!(!comment.is_top_level());
    }

    #[test]
    fn test_reply_view_carries_author_summary() {
        let r = row(Some(Uuid::new_v4()));
        let author_id = r.author_id;

        let view = ReplyView::from(r);
        assert_eq!(view.author.id, author_id);
        assert_eq!(view.author.name, "alice");
    }
}
