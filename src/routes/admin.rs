//! Admin routes: visit metrics and the dev-only environment reset.

use actix_web::{web, HttpResponse};
use sqlx::PgPool;

use crate::configuration::ApplicationSettings;
use crate::error::AppError;
use crate::metrics::SiteMetrics;

/// GET /admin/metrics
pub async fn metrics_page(metrics: web::Data<SiteMetrics>) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(format!(
            "<html><body><h1>Welcome, Murmur Admin</h1>\
             <p>Murmur has been visited {} times!</p></body></html>",
            metrics.hits()
        ))
}

/// POST /admin/reset
///
/// Zero the visit counter and delete every user (posts and refresh
/// tokens go with them via cascade). Only honored on the dev platform.
///
/// # Errors
/// - 403: not running on the dev platform
/// - 500: storage failure
pub async fn reset(
    pool: web::Data<PgPool>,
    metrics: web::Data<SiteMetrics>,
    app_config: web::Data<ApplicationSettings>,
) -> Result<HttpResponse, AppError> {
    if app_config.platform != "dev" {
        return Err(AppError::Forbidden(
            "reset is only available on the dev platform".to_string(),
        ));
    }

    sqlx::query("DELETE FROM users")
        .execute(pool.get_ref())
        .await?;
    metrics.reset();

    tracing::info!("visit counter reset and all users deleted");

    Ok(HttpResponse::Ok().finish())
}
