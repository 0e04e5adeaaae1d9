mod authentication;
mod cache;
mod data_formats;
mod db_helpers;
mod errors;
mod handlers;
mod models;
mod pagination;

use anyhow::Context;
pub use anyhow::Result;
use axum::{routing::*, Extension, Router};
pub use cache::{ResponseCache, HOME_FEED_CACHE_TTL};
pub use data_formats::*;
use handlers::*;
pub use pagination::{paginate, Page, POSTS_PER_PAGE_LIMIT};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::{
    net::{SocketAddr, TcpListener},
    str::FromStr,
    sync::Arc,
};

pub async fn run_app(app: Router, address: SocketAddr, pool: SqlitePool) -> Result<()> {
    let app = app.layer(Extension(Arc::new(pool)));
    axum::Server::bind(&address)
        .serve(app.into_make_service())
        .await?;
    Ok(())
}

pub async fn init_db(db_url: &str) -> Result<SqlitePool> {
    // Foreign keys must be on for ON DELETE CASCADE / SET NULL to apply.
    let options = SqliteConnectOptions::from_str(db_url)
        .context("invalid database url")?
        .create_if_missing(true)
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new().connect_with(options).await?;
    tracing::info!("Running migrations");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Migrations completed");
    Ok(pool)
}

pub fn get_random_free_port() -> (u16, SocketAddr) {
    let listener = TcpListener::bind("localhost:0").unwrap();
    match listener.local_addr() {
        Ok(addr) => (addr.port(), addr),
        Err(_) => panic!("Could not get a free port"),
    }
}

pub fn make_router(cache: ResponseCache) -> Router {
    Router::new()
        .route("/check_health", get(alive))
        .route("/", get(index))
        .route("/group/:slug", get(group_posts))
        .route("/profile/:username", get(profile))
        .route("/profile/:username/follow", post(profile_follow))
        .route("/profile/:username/unfollow", post(profile_unfollow))
        .route("/posts/:id", get(post_detail))
        .route("/posts/:id/edit", get(post_edit_form).post(post_edit))
        .route("/posts/:id/comment", post(add_comment))
        .route("/create", get(post_create_form).post(post_create))
        .route("/follow", get(follow_index))
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .fallback(not_found)
        .layer(Extension(cache))
}
