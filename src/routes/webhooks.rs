//! Payment-provider webhook.

use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, DatabaseError};

const UPGRADE_EVENT: &str = "user.upgraded";

#[derive(Deserialize)]
pub struct WebhookRequest {
    pub event: String,
    pub data: WebhookData,
}

#[derive(Deserialize)]
pub struct WebhookData {
    pub user_id: String,
}

/// POST /api/webhooks
///
/// Handle a payment-provider callback. Only `user.upgraded` does
/// anything (flips the premium flag); every other event is acknowledged
/// and dropped so the provider does not retry it.
///
/// # Errors
/// - 404: unknown or unparseable user id
/// - 500: storage failure
pub async fn payment_webhook(
    form: web::Json<WebhookRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    if form.event != UPGRADE_EVENT {
        tracing::debug!(event = %form.event, "ignoring webhook event");
        return Ok(HttpResponse::NoContent().finish());
    }

    let user_id = Uuid::parse_str(&form.data.user_id)
        .map_err(|_| DatabaseError::NotFound("user not found".to_string()))?;

    let result = sqlx::query(
        r#"
        UPDATE users SET is_premium = TRUE, updated_at = $1 WHERE id = $2
        "#,
    )
    .bind(Utc::now())
    .bind(user_id)
    .execute(pool.get_ref())
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound("user not found".to_string()).into());
    }

    tracing::info!(user_id = %user_id, "user upgraded to premium");

    Ok(HttpResponse::NoContent().finish())
}
