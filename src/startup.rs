use actix_files as fs;
use actix_web::dev::Server;
use actix_web::{guard, web, App, HttpServer};
use sqlx::PgPool;
use std::net::TcpListener;

use crate::configuration::Settings;
use crate::metrics::SiteMetrics;
use crate::middleware::{BearerAuth, PageHits, RequestLogger};
use crate::routes::{
    create_post, create_user, delete_post, get_post, health_check, list_posts, login,
    metrics_page, payment_webhook, refresh, reset, revoke, update_user,
};

pub fn run(
    listener: TcpListener,
    connection: PgPool,
    settings: Settings,
) -> Result<Server, std::io::Error> {
    let connection = web::Data::new(connection);
    let auth_config = web::Data::new(settings.auth.clone());
    let app_config = web::Data::new(settings.application.clone());
    let metrics = web::Data::new(SiteMetrics::new());

    let server = HttpServer::new(move || {
        App::new()
            .wrap(RequestLogger)
            // Shared state
            .app_data(connection.clone())
            .app_data(auth_config.clone())
            .app_data(app_config.clone())
            .app_data(metrics.clone())
            // Public routes
            .route("/api/healthz", web::get().to(health_check))
            .route("/api/users", web::post().to(create_user))
            .route("/api/login", web::post().to(login))
            .route("/api/refresh", web::post().to(refresh))
            .route("/api/revoke", web::post().to(revoke))
            .route("/api/posts", web::get().to(list_posts))
            .route("/api/posts/{post_id}", web::get().to(get_post))
            .route("/api/webhooks", web::post().to(payment_webhook))
            // Admin routes
            .route("/admin/metrics", web::get().to(metrics_page))
            .route("/admin/reset", web::post().to(reset))
            // Protected routes (bearer access token via the auth gateway)
            .service(
                web::resource("/api/posts")
                    .guard(guard::Post())
                    .wrap(BearerAuth::new(settings.auth.clone()))
                    .route(web::post().to(create_post)),
            )
            .service(
                web::resource("/api/posts/{post_id}")
                    .guard(guard::Delete())
                    .wrap(BearerAuth::new(settings.auth.clone()))
                    .route(web::delete().to(delete_post)),
            )
            .service(
                web::resource("/api/users")
                    .guard(guard::Put())
                    .wrap(BearerAuth::new(settings.auth.clone()))
                    .route(web::put().to(update_user)),
            )
            // Static site, counted by the hit middleware
            .service(
                web::scope("/app")
                    .wrap(PageHits::new(metrics.clone()))
                    .service(fs::Files::new("/", "./public").index_file("index.html")),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
