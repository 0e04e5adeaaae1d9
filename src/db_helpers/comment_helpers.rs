use sqlx::{Sqlite, SqlitePool};

use crate::{errors::RequestError, models::Comment};

const COMMENT_QUERY: &str = r#"
    SELECT comments.id        AS "id",
           comments.post_id   AS "post_id",
           comments.author_id AS "author_id",
           comments.text      AS "text",
           comments.created   AS "created",
           users.username     AS "author_username"
    FROM comments
         JOIN users ON users.id = comments.author_id
"#;

/// The newest `limit` comments on a post.
pub async fn list_recent_comments(
    pool: &SqlitePool,
    post_id: i64,
    limit: i64,
) -> Result<Vec<Comment>, RequestError> {
    let mut tx = pool.begin().await?;
    let result = sqlx::query_as::<Sqlite, Comment>(&format!(
        r#"{COMMENT_QUERY}
        WHERE comments.post_id = $1
        ORDER BY comments.created DESC, comments.id DESC
        LIMIT $2"#
    ))
    .bind(post_id)
    .bind(limit)
    .fetch_all(&mut tx)
    .await?;
    tx.commit().await?;
    Ok(result)
}

pub async fn insert_comment(
    pool: &SqlitePool,
    post_id: i64,
    author_id: i64,
    text: &str,
) -> Result<i64, RequestError> {
    let mut tx = pool.begin().await?;
    let id = sqlx::query_scalar::<Sqlite, i64>(
        r#"
        INSERT INTO comments (post_id, author_id, text)
        VALUES ($1, $2, $3)
        RETURNING id
        "#,
    )
    .bind(post_id)
    .bind(author_id)
    .bind(text)
    .fetch_one(&mut tx)
    .await?;
    tx.commit().await?;
    Ok(id)
}
