use std::net::SocketAddr;

use anyhow::Context;
use microblog::{init_db, make_router, run_app, ResponseCache, HOME_FEED_CACHE_TTL};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt().init();

    let addr = SocketAddr::from(([127, 0, 0, 1], 3001));
    if let Err(error) = run(addr).await {
        tracing::error!("Error: {error}");
    }
}

async fn run(addr: SocketAddr) -> microblog::Result<()> {
    let db_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let pool = init_db(&db_url).await?;
    let router = make_router(ResponseCache::new(HOME_FEED_CACHE_TTL));
    tracing::info!("Server started on {addr}");
    run_app(router, addr, pool).await
}
