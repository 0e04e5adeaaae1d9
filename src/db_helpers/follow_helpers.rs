use sqlx::SqlitePool;

use crate::{errors::RequestError, models::User};

use super::get_user_by_username;

/// Creates a follow edge from `user_id` to the named author. Self-follows
/// and already-existing edges are silently ignored; this function is the
/// sole owner of both rules. Returns the resolved author so callers can
/// redirect to their profile.
pub async fn follow_author_in_db(
    pool: &SqlitePool,
    user_id: i64,
    username: &str,
) -> Result<User, RequestError> {
    let author = match get_user_by_username(pool, username).await? {
        Some(user) => user,
        None => return Err(RequestError::NotFound),
    };
    if author.id != user_id {
        let mut tx = pool.begin().await?;
        // ON CONFLICT DO NOTHING makes the duplicate check race-free; the
        // unique index on (user_id, author_id) backs it at the storage level.
        sqlx::query(
            r#"
            INSERT INTO follows (user_id, author_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, author_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(author.id)
        .execute(&mut tx)
        .await?;
        tx.commit().await?;
    }
    Ok(author)
}

/// Removes every follow edge for the pair; a no-op when none exist.
pub async fn unfollow_author_in_db(
    pool: &SqlitePool,
    user_id: i64,
    username: &str,
) -> Result<User, RequestError> {
    let author = match get_user_by_username(pool, username).await? {
        Some(user) => user,
        None => return Err(RequestError::NotFound),
    };
    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM follows WHERE user_id = $1 AND author_id = $2")
        .bind(user_id)
        .bind(author.id)
        .execute(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(author)
}

pub async fn is_following(
    pool: &SqlitePool,
    user_id: i64,
    author_id: i64,
) -> Result<bool, RequestError> {
    let mut tx = pool.begin().await?;
    let row = sqlx::query("SELECT 1 FROM follows WHERE user_id = $1 AND author_id = $2")
        .bind(user_id)
        .bind(author_id)
        .fetch_optional(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(row.is_some())
}
