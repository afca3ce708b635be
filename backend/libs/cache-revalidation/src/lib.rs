//! Path Revalidation Library using Redis Pub/Sub
//!
//! Lets a data service tell the rendering layer that previously cached
//! content at a logical path is stale and must be re-rendered.
//!
//! # Architecture
//!
//! ```text
//! thread-service:
//!   1. Insert thread/comment in DB
//!   2. Publish revalidation to Redis:
//!      PUBLISH cache:revalidate {"path": "/threads"}
//!      ↓
//! Redis Pub/Sub (broadcast to all subscribers)
//!      ↓
//! Rendering layer:
//!   3. Receive revalidation message
//!   4. Drop the cached page for that path and re-render on next request
//! ```
//!
//! # Example: Publisher
//!
//! ```no_run
//! use cache_revalidation::RevalidationPublisher;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let publisher = RevalidationPublisher::new(
//!         "redis://localhost:6379",
//!         "thread-service".to_string()
//!     ).await?;
//!
//!     publisher.revalidate_path("/threads").await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Example: Subscriber
//!
//! ```no_run
//! use cache_revalidation::{RevalidationSubscriber, RevalidationMessage};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let subscriber = RevalidationSubscriber::new("redis://localhost:6379").await?;
//!
//!     let handle = subscriber.subscribe(|msg| async move {
//!         println!("Revalidating: {}", msg.path);
//!         Ok(())
//!     }).await?;
//!
//!     handle.await?;
//!     Ok(())
//! }
//! ```

use futures_util::StreamExt;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

mod error;

pub use error::RevalidationError;

type Result<T> = std::result::Result<T, RevalidationError>;

/// Revalidation message broadcast to the rendering layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevalidationMessage {
    pub message_id: String,
    /// Logical path whose cached rendering is now stale (e.g. "/threads/123")
    pub path: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub source_service: String,
}

impl RevalidationMessage {
    /// Create a new revalidation message for a path
    pub fn for_path(path: String, source_service: String) -> Self {
        Self {
            message_id: uuid::Uuid::new_v4().to_string(),
            path,
            timestamp: chrono::Utc::now(),
            source_service,
        }
    }
}

/// Publisher for path revalidation events
#[derive(Clone)]
pub struct RevalidationPublisher {
    client: ConnectionManager,
    channel: String,
    service_name: String,
}

impl RevalidationPublisher {
    /// Default Redis channel for path revalidation
    pub const DEFAULT_CHANNEL: &'static str = "cache:revalidate";

    /// Create new publisher
    ///
    /// # Arguments
    ///
    /// * `redis_url` - Redis connection URL (e.g., "redis://localhost:6379")
    /// * `service_name` - Name of the publishing service (e.g., "thread-service")
    pub async fn new(redis_url: &str, service_name: String) -> Result<Self> {
        let client = Client::open(redis_url)?;
        let connection = ConnectionManager::new(client).await?;

        Ok(Self {
            client: connection,
            channel: Self::DEFAULT_CHANNEL.to_string(),
            service_name,
        })
    }

    /// Create publisher with custom channel
    pub async fn with_channel(
        redis_url: &str,
        service_name: String,
        channel: String,
    ) -> Result<Self> {
        let client = Client::open(redis_url)?;
        let connection = ConnectionManager::new(client).await?;

        Ok(Self {
            client: connection,
            channel,
            service_name,
        })
    }

    /// Publish a revalidation message
    ///
    /// Returns number of subscribers that received the message
    pub async fn publish(&self, msg: RevalidationMessage) -> Result<usize> {
        let payload = serde_json::to_string(&msg)?;

        debug!(
            message_id = %msg.message_id,
            path = %msg.path,
            channel = %self.channel,
            "Publishing revalidation message"
        );

        let mut conn = self.client.clone();
        let subscriber_count: usize = conn.publish(&self.channel, payload).await?;

        info!(
            message_id = %msg.message_id,
            path = %msg.path,
            subscribers = subscriber_count,
            "Revalidation message published"
        );

        Ok(subscriber_count)
    }

    /// Revalidate a single path
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use cache_revalidation::RevalidationPublisher;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// # let publisher = RevalidationPublisher::new("redis://localhost", "test".into()).await?;
    /// publisher.revalidate_path("/threads/123").await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn revalidate_path(&self, path: &str) -> Result<usize> {
        let msg = RevalidationMessage::for_path(path.to_string(), self.service_name.clone());
        self.publish(msg).await
    }
}

/// Subscriber for path revalidation events
pub struct RevalidationSubscriber {
    client: Client,
    channel: String,
}

impl RevalidationSubscriber {
    /// Create new subscriber
    pub async fn new(redis_url: &str) -> Result<Self> {
        let client = Client::open(redis_url)?;

        Ok(Self {
            client,
            channel: RevalidationPublisher::DEFAULT_CHANNEL.to_string(),
        })
    }

    /// Create subscriber with custom channel
    pub async fn with_channel(redis_url: &str, channel: String) -> Result<Self> {
        let client = Client::open(redis_url)?;

        Ok(Self { client, channel })
    }

    /// Subscribe to revalidation events with callback
    ///
    /// Returns JoinHandle for background task
    pub async fn subscribe<F, Fut>(&self, callback: F) -> Result<JoinHandle<()>>
    where
        F: Fn(RevalidationMessage) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<()>> + Send + 'static,
    {
        let mut pubsub = self.client.get_async_pubsub().await?;
        pubsub.subscribe(&self.channel).await?;

        info!(channel = %self.channel, "Subscribed to revalidation events");

        let callback = Arc::new(callback);

        let handle = tokio::spawn(async move {
            let mut stream = pubsub.on_message();

            while let Some(msg) = stream.next().await {
                let payload = match msg.get_payload::<String>() {
                    Ok(p) => p,
                    Err(e) => {
                        error!(error = ?e, "Failed to get message payload");
                        continue;
                    }
                };

                let revalidation_msg: RevalidationMessage = match serde_json::from_str(&payload) {
                    Ok(m) => m,
                    Err(e) => {
                        error!(error = ?e, payload = %payload, "Failed to deserialize message");
                        continue;
                    }
                };

                debug!(
                    message_id = %revalidation_msg.message_id,
                    path = %revalidation_msg.path,
                    "Received revalidation message"
                );

                let callback_clone = Arc::clone(&callback);
                if let Err(e) = callback_clone(revalidation_msg.clone()).await {
                    error!(
                        error = ?e,
                        message_id = %revalidation_msg.message_id,
                        "Callback execution failed"
                    );
                }
            }

            warn!("Revalidation subscription ended");
        });

        Ok(handle)
    }

    /// Stop subscription
    pub async fn unsubscribe(&self, handle: JoinHandle<()>) -> Result<()> {
        handle.abort();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_for_path() {
        let msg =
            RevalidationMessage::for_path("/threads".to_string(), "thread-service".to_string());

        assert_eq!(msg.path, "/threads");
        assert_eq!(msg.source_service, "thread-service");
        assert!(!msg.message_id.is_empty());
    }

    #[test]
    fn test_message_ids_are_unique() {
        let a = RevalidationMessage::for_path("/threads".to_string(), "test".to_string());
        let b = RevalidationMessage::for_path("/threads".to_string(), "test".to_string());

        assert_ne!(a.message_id, b.message_id);
    }

    #[test]
    fn test_message_serialization() {
        let msg = RevalidationMessage::for_path(
            "/threads/123".to_string(),
            "thread-service".to_string(),
        );

        let json = serde_json::to_string(&msg).unwrap();
        let deserialized: RevalidationMessage = serde_json::from_str(&json).unwrap();

        assert_eq!(msg.message_id, deserialized.message_id);
        assert_eq!(msg.path, deserialized.path);
        assert_eq!(msg.source_service, deserialized.source_service);
    }
}
