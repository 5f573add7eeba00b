//! Integration tests for the post CRUD surface, the payment webhook and
//! the admin endpoints.

use serde_json::{json, Value};
use sqlx::{Connection, Executor, PgConnection, PgPool};
use std::net::TcpListener;

use murmur::configuration::{get_configuration, DatabaseSettings};
use murmur::startup::run;

pub struct TestApp {
    pub address: String,
    pub db_pool: PgPool,
}

async fn spawn_app() -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    let mut configuration = get_configuration().expect("Failed to read configuration.");
    configuration.database.database_name = uuid::Uuid::new_v4().to_string();
    let connection_pool = configure_database(&configuration.database).await;

    let server =
        run(listener, connection_pool.clone(), configuration).expect("Failed to bind address");
    let _ = tokio::spawn(server);

    TestApp {
        address,
        db_pool: connection_pool,
    }
}

async fn configure_database(config: &DatabaseSettings) -> PgPool {
    let mut connection = PgConnection::connect(&config.connection_string_without_db())
        .await
        .expect("Failed to connect to Postgres");
    connection
        .execute(&*format!(r#"CREATE DATABASE "{}";"#, config.database_name))
        .await
        .expect("Failed to create database.");

    let connection_pool = PgPool::connect(&config.connection_string())
        .await
        .expect("Failed to connect to Postgres.");
    sqlx::migrate!("./migrations")
        .run(&connection_pool)
        .await
        .expect("Failed to migrate the database.");
    connection_pool
}

/// Create a user, log in, and return (user_id, access_token).
async fn signed_in_user(
    client: &reqwest::Client,
    address: &str,
    email: &str,
) -> (String, String) {
    let response = client
        .post(&format!("{}/api/users", address))
        .json(&json!({ "email": email, "password": "pw" }))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(201, response.status().as_u16());
    let user: Value = response.json().await.expect("Failed to parse response");

    let response = client
        .post(&format!("{}/api/login", address))
        .json(&json!({ "email": email, "password": "pw" }))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(200, response.status().as_u16());
    let session: Value = response.json().await.expect("Failed to parse response");

    (
        user["id"].as_str().unwrap().to_string(),
        session["token"].as_str().unwrap().to_string(),
    )
}

async fn create_post(
    client: &reqwest::Client,
    address: &str,
    token: &str,
    body: &str,
) -> Value {
    let response = client
        .post(&format!("{}/api/posts", address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "body": body }))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(201, response.status().as_u16());
    response.json().await.expect("Failed to parse response")
}

// --- Creation ---

#[tokio::test]
async fn create_post_stores_the_filtered_body() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let (user_id, token) = signed_in_user(&client, &app.address, "u1@example.com").await;

    let post = create_post(
        &client,
        &app.address,
        &token,
        "This is a kerfuffle opinion I need to share with the world",
    )
    .await;

    assert_eq!(
        post["body"],
        "This is a **** opinion I need to share with the world"
    );
    assert_eq!(post["user_id"], user_id);

    // The stored copy is the filtered one.
    let post_id = post["id"].as_str().unwrap();
    let response = client
        .get(&format!("{}/api/posts/{}", app.address, post_id))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(200, response.status().as_u16());
    let fetched: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(
        fetched["body"],
        "This is a **** opinion I need to share with the world"
    );
}

#[tokio::test]
async fn create_post_rejects_bodies_over_140_chars() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let (_, token) = signed_in_user(&client, &app.address, "u1@example.com").await;

    let response = client
        .post(&format!("{}/api/posts", app.address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "body": "a".repeat(141) }))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(400, response.status().as_u16());
}

#[tokio::test]
async fn a_140_char_body_is_accepted() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let (_, token) = signed_in_user(&client, &app.address, "u1@example.com").await;

    create_post(&client, &app.address, &token, &"a".repeat(140)).await;
}

// --- Listing and fetching ---

#[tokio::test]
async fn list_posts_returns_all_posts_oldest_first() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let (_, token) = signed_in_user(&client, &app.address, "u1@example.com").await;

    create_post(&client, &app.address, &token, "first").await;
    create_post(&client, &app.address, &token, "second").await;

    let response = client
        .get(&format!("{}/api/posts", app.address))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(200, response.status().as_u16());

    let posts: Vec<Value> = response.json().await.expect("Failed to parse response");
    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0]["body"], "first");
    assert_eq!(posts[1]["body"], "second");
}

#[tokio::test]
async fn get_post_returns_404_for_unknown_and_unparseable_ids() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    for id in [uuid::Uuid::new_v4().to_string(), "not-a-uuid".to_string()] {
        let response = client
            .get(&format!("{}/api/posts/{}", app.address, id))
            .send()
            .await
            .expect("Failed to execute request.");
        assert_eq!(404, response.status().as_u16(), "id: {}", id);
    }
}

// --- Deletion ---

#[tokio::test]
async fn owner_can_delete_their_post() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let (_, token) = signed_in_user(&client, &app.address, "u1@example.com").await;

    let post = create_post(&client, &app.address, &token, "ephemeral").await;
    let post_id = post["id"].as_str().unwrap();

    let response = client
        .delete(&format!("{}/api/posts/{}", app.address, post_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(204, response.status().as_u16());

    let response = client
        .get(&format!("{}/api/posts/{}", app.address, post_id))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(404, response.status().as_u16());
}

#[tokio::test]
async fn deleting_someone_elses_post_is_forbidden() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let (_, owner_token) = signed_in_user(&client, &app.address, "owner@example.com").await;
    let (_, intruder_token) = signed_in_user(&client, &app.address, "intruder@example.com").await;

    let post = create_post(&client, &app.address, &owner_token, "mine").await;
    let post_id = post["id"].as_str().unwrap();

    let response = client
        .delete(&format!("{}/api/posts/{}", app.address, post_id))
        .header("Authorization", format!("Bearer {}", intruder_token))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(403, response.status().as_u16());

    // The post is still there.
    let response = client
        .get(&format!("{}/api/posts/{}", app.address, post_id))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(200, response.status().as_u16());
}

#[tokio::test]
async fn deleting_requires_authentication() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let (_, token) = signed_in_user(&client, &app.address, "u1@example.com").await;

    let post = create_post(&client, &app.address, &token, "mine").await;
    let post_id = post["id"].as_str().unwrap();

    let response = client
        .delete(&format!("{}/api/posts/{}", app.address, post_id))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(401, response.status().as_u16());
}

// --- Webhooks ---

#[tokio::test]
async fn upgrade_webhook_flips_the_premium_flag() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let (user_id, _) = signed_in_user(&client, &app.address, "u1@example.com").await;

    let response = client
        .post(&format!("{}/api/webhooks", app.address))
        .json(&json!({ "event": "user.upgraded", "data": { "user_id": user_id } }))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(204, response.status().as_u16());

    let response = client
        .post(&format!("{}/api/login", app.address))
        .json(&json!({ "email": "u1@example.com", "password": "pw" }))
        .send()
        .await
        .expect("Failed to execute request.");
    let session: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(session["is_premium"], true);
}

#[tokio::test]
async fn unrelated_webhook_events_are_acknowledged_and_ignored() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let (user_id, _) = signed_in_user(&client, &app.address, "u1@example.com").await;

    let response = client
        .post(&format!("{}/api/webhooks", app.address))
        .json(&json!({ "event": "user.downgraded", "data": { "user_id": user_id } }))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(204, response.status().as_u16());

    let response = client
        .post(&format!("{}/api/login", app.address))
        .json(&json!({ "email": "u1@example.com", "password": "pw" }))
        .send()
        .await
        .expect("Failed to execute request.");
    let session: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(session["is_premium"], false);
}

#[tokio::test]
async fn upgrade_webhook_returns_404_for_an_unknown_user() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    for user_id in [uuid::Uuid::new_v4().to_string(), "not-a-uuid".to_string()] {
        let response = client
            .post(&format!("{}/api/webhooks", app.address))
            .json(&json!({ "event": "user.upgraded", "data": { "user_id": user_id } }))
            .send()
            .await
            .expect("Failed to execute request.");
        assert_eq!(404, response.status().as_u16(), "user_id: {}", user_id);
    }
}

// --- Admin ---

#[tokio::test]
async fn static_site_hits_show_up_on_the_metrics_page() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    for _ in 0..2 {
        client
            .get(&format!("{}/app/", app.address))
            .send()
            .await
            .expect("Failed to execute request.");
    }

    let response = client
        .get(&format!("{}/admin/metrics", app.address))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(200, response.status().as_u16());

    let page = response.text().await.expect("Failed to read body");
    assert!(
        page.contains("visited 2 times"),
        "unexpected metrics page: {}",
        page
    );
}

#[tokio::test]
async fn reset_deletes_users_and_zeroes_the_counter_on_dev() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    signed_in_user(&client, &app.address, "u1@example.com").await;

    client
        .get(&format!("{}/app/", app.address))
        .send()
        .await
        .expect("Failed to execute request.");

    let response = client
        .post(&format!("{}/admin/reset", app.address))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(200, response.status().as_u16());

    // Users are gone; login no longer works.
    let response = client
        .post(&format!("{}/api/login", app.address))
        .json(&json!({ "email": "u1@example.com", "password": "pw" }))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(401, response.status().as_u16());

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(&app.db_pool)
        .await
        .expect("Failed to count users");
    assert_eq!(count, 0);

    let page = client
        .get(&format!("{}/admin/metrics", app.address))
        .send()
        .await
        .expect("Failed to execute request.")
        .text()
        .await
        .expect("Failed to read body");
    assert!(
        page.contains("visited 0 times"),
        "unexpected metrics page: {}",
        page
    );
}
