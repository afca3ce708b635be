/// Thread handlers - HTTP endpoints for thread operations
use crate::error::Result;
use crate::services::ThreadService;
use actix_web::{web, HttpResponse};
use cache_revalidation::RevalidationPublisher;
use serde::Deserialize;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CreateThreadRequest {
    pub text: String,
    pub author_id: Uuid,
    /// Rendering-layer path to revalidate on success
    pub path: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub text: String,
    pub user_id: Uuid,
    /// Rendering-layer path to revalidate on success
    pub path: String,
}

#[derive(Debug, Deserialize)]
pub struct PageParams {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    20
}

#[derive(Debug, Deserialize)]
pub struct PaginationParams {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    20
}

/// Create a new top-level thread
pub async fn create_thread(
    pool: web::Data<PgPool>,
    revalidator: web::Data<Arc<RevalidationPublisher>>,
    req: web::Json<CreateThreadRequest>,
) -> Result<HttpResponse> {
    let service = ThreadService::with_revalidation((**pool).clone(), revalidator.get_ref().clone());

    let thread = service
        .create_thread(req.author_id, &req.text, &req.path)
        .await?;

    Ok(HttpResponse::Created().json(thread))
}

/// List one page of top-level threads
pub async fn list_threads(
    pool: web::Data<PgPool>,
    query: web::Query<PageParams>,
) -> Result<HttpResponse> {
    let service = ThreadService::new((**pool).clone());
    let page = service.list_threads(query.page, query.page_size).await?;

    Ok(HttpResponse::Ok().json(page))
}

/// Get a thread by ID with two levels of replies expanded
pub async fn get_thread(
    pool: web::Data<PgPool>,
    thread_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let service = ThreadService::new((**pool).clone());
    match service.get_thread(*thread_id).await? {
        Some(thread) => Ok(HttpResponse::Ok().json(thread)),
        None => Ok(HttpResponse::NotFound().finish()),
    }
}

/// Append a comment to an existing thread
pub async fn add_comment(
    pool: web::Data<PgPool>,
    revalidator: web::Data<Arc<RevalidationPublisher>>,
    thread_id: web::Path<Uuid>,
    req: web::Json<CreateCommentRequest>,
) -> Result<HttpResponse> {
    let service = ThreadService::with_revalidation((**pool).clone(), revalidator.get_ref().clone());

    let comment = service
        .add_comment(*thread_id, req.user_id, &req.text, &req.path)
        .await?;

    Ok(HttpResponse::Created().json(comment))
}

/// List threads authored by a user
pub async fn get_user_threads(
    pool: web::Data<PgPool>,
    user_id: web::Path<Uuid>,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    let service = ThreadService::new((**pool).clone());
    let threads = service
        .list_user_threads(*user_id, query.limit, query.offset)
        .await?;

    Ok(HttpResponse::Ok().json(threads))
}
