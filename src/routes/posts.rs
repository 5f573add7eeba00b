//! Post routes: create, list, fetch and delete.

use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::Claims;
use crate::error::{AppError, DatabaseError, ValidationError};
use crate::moderation::censor;

const MAX_POST_LENGTH: usize = 140;

#[derive(Deserialize)]
pub struct PostRequest {
    pub body: String,
}

#[derive(Serialize)]
pub struct PostResponse {
    pub id: String,
    pub created_at: String,
    pub updated_at: String,
    pub body: String,
    pub user_id: String,
}

fn post_not_found() -> AppError {
    DatabaseError::NotFound("post not found".to_string()).into()
}

/// POST /api/posts
///
/// Create a post owned by the authenticated subject. The body is capped
/// at 140 characters and passed through the word filter before storage.
///
/// # Errors
/// - 400: body too long
/// - 401: missing or invalid access token (middleware)
pub async fn create_post(
    claims: web::ReqData<Claims>,
    form: web::Json<PostRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let user_id = claims.subject()?;

    if form.body.chars().count() > MAX_POST_LENGTH {
        return Err(ValidationError::TooLong("body".to_string(), MAX_POST_LENGTH).into());
    }
    let body = censor(&form.body);

    let post_id = Uuid::new_v4();
    let now = Utc::now();
    sqlx::query(
        r#"
        INSERT INTO posts (id, created_at, updated_at, body, user_id)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(post_id)
    .bind(now)
    .bind(now)
    .bind(&body)
    .bind(user_id)
    .execute(pool.get_ref())
    .await?;

    tracing::info!(post_id = %post_id, user_id = %user_id, "post created");

    Ok(HttpResponse::Created().json(PostResponse {
        id: post_id.to_string(),
        created_at: now.to_rfc3339(),
        updated_at: now.to_rfc3339(),
        body,
        user_id: user_id.to_string(),
    }))
}

/// GET /api/posts
///
/// List all posts, oldest first.
pub async fn list_posts(pool: web::Data<PgPool>) -> Result<HttpResponse, AppError> {
    let rows = sqlx::query_as::<_, (Uuid, DateTime<Utc>, DateTime<Utc>, String, Uuid)>(
        r#"
        SELECT id, created_at, updated_at, body, user_id
        FROM posts
        ORDER BY created_at ASC
        "#,
    )
    .fetch_all(pool.get_ref())
    .await?;

    let posts: Vec<PostResponse> = rows
        .into_iter()
        .map(|(id, created_at, updated_at, body, user_id)| PostResponse {
            id: id.to_string(),
            created_at: created_at.to_rfc3339(),
            updated_at: updated_at.to_rfc3339(),
            body,
            user_id: user_id.to_string(),
        })
        .collect();

    Ok(HttpResponse::Ok().json(posts))
}

/// GET /api/posts/{post_id}
///
/// Fetch a single post. An unparseable id is indistinguishable from an
/// unknown one.
pub async fn get_post(
    path: web::Path<String>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let post_id = Uuid::parse_str(&path.into_inner()).map_err(|_| post_not_found())?;

    let row = sqlx::query_as::<_, (Uuid, DateTime<Utc>, DateTime<Utc>, String, Uuid)>(
        r#"
        SELECT id, created_at, updated_at, body, user_id
        FROM posts
        WHERE id = $1
        "#,
    )
    .bind(post_id)
    .fetch_optional(pool.get_ref())
    .await?
    .ok_or_else(post_not_found)?;

    let (id, created_at, updated_at, body, user_id) = row;
    Ok(HttpResponse::Ok().json(PostResponse {
        id: id.to_string(),
        created_at: created_at.to_rfc3339(),
        updated_at: updated_at.to_rfc3339(),
        body,
        user_id: user_id.to_string(),
    }))
}

/// DELETE /api/posts/{post_id}
///
/// Delete a post the authenticated subject owns.
///
/// # Errors
/// - 401: missing or invalid access token (middleware)
/// - 403: the post belongs to a different subject
/// - 404: unknown post
pub async fn delete_post(
    claims: web::ReqData<Claims>,
    path: web::Path<String>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let user_id = claims.subject()?;
    let post_id = Uuid::parse_str(&path.into_inner()).map_err(|_| post_not_found())?;

    let owner = sqlx::query_as::<_, (Uuid,)>(
        r#"
        SELECT user_id FROM posts WHERE id = $1
        "#,
    )
    .bind(post_id)
    .fetch_optional(pool.get_ref())
    .await?
    .ok_or_else(post_not_found)?
    .0;

    if owner != user_id {
        return Err(AppError::Forbidden(
            "you do not have permission to delete this post".to_string(),
        ));
    }

    sqlx::query("DELETE FROM posts WHERE id = $1")
        .bind(post_id)
        .execute(pool.get_ref())
        .await?;

    tracing::info!(post_id = %post_id, user_id = %user_id, "post deleted");

    Ok(HttpResponse::NoContent().finish())
}
