mod admin;
mod auth;
mod health_check;
mod posts;
mod users;
mod webhooks;

pub use admin::{metrics_page, reset};
pub use auth::{login, refresh, revoke};
pub use health_check::health_check;
pub use posts::{create_post, delete_post, get_post, list_posts};
pub use users::{create_user, update_user};
pub use webhooks::payment_webhook;
