use sqlx::{Sqlite, SqlitePool};

use crate::{errors::RequestError, models::Post};

const POST_QUERY: &str = r#"
    SELECT posts.id        AS "id",
           posts.text      AS "text",
           posts.pub_date  AS "pub_date",
           posts.author_id AS "author_id",
           posts.image     AS "image",
           users.username  AS "author_username",
           groups.slug     AS "group_slug",
           groups.title    AS "group_title"
    FROM posts
         JOIN users ON users.id = posts.author_id
         LEFT JOIN groups ON groups.id = posts.group_id
"#;

// The id tiebreak keeps the order total when timestamps collide at
// second resolution.
const POST_ORDER: &str = "ORDER BY posts.pub_date DESC, posts.id DESC";

pub async fn list_all_posts(pool: &SqlitePool) -> Result<Vec<Post>, RequestError> {
    let mut tx = pool.begin().await?;
    let result = sqlx::query_as::<Sqlite, Post>(&format!("{POST_QUERY} {POST_ORDER}"))
        .fetch_all(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(result)
}

pub async fn list_group_posts(
    pool: &SqlitePool,
    group_id: i64,
) -> Result<Vec<Post>, RequestError> {
    let mut tx = pool.begin().await?;
    let result = sqlx::query_as::<Sqlite, Post>(&format!(
        "{POST_QUERY} WHERE posts.group_id = $1 {POST_ORDER}"
    ))
    .bind(group_id)
    .fetch_all(&mut tx)
    .await?;
    tx.commit().await?;
    Ok(result)
}

pub async fn list_author_posts(
    pool: &SqlitePool,
    author_id: i64,
) -> Result<Vec<Post>, RequestError> {
    let mut tx = pool.begin().await?;
    let result = sqlx::query_as::<Sqlite, Post>(&format!(
        "{POST_QUERY} WHERE posts.author_id = $1 {POST_ORDER}"
    ))
    .bind(author_id)
    .fetch_all(&mut tx)
    .await?;
    tx.commit().await?;
    Ok(result)
}

/// Posts written by any author the given user follows.
pub async fn list_followed_posts(
    pool: &SqlitePool,
    user_id: i64,
) -> Result<Vec<Post>, RequestError> {
    let mut tx = pool.begin().await?;
    let result = sqlx::query_as::<Sqlite, Post>(&format!(
        r#"{POST_QUERY}
        WHERE posts.author_id IN (SELECT author_id FROM follows WHERE user_id = $1)
        {POST_ORDER}"#
    ))
    .bind(user_id)
    .fetch_all(&mut tx)
    .await?;
    tx.commit().await?;
    Ok(result)
}

pub async fn get_post_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Post>, RequestError> {
    let mut tx = pool.begin().await?;
    let result = sqlx::query_as::<Sqlite, Post>(&format!("{POST_QUERY} WHERE posts.id = $1"))
        .bind(id)
        .fetch_optional(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(result)
}

pub async fn count_author_posts(pool: &SqlitePool, author_id: i64) -> Result<i64, RequestError> {
    let mut tx = pool.begin().await?;
    let count =
        sqlx::query_scalar::<Sqlite, i64>("SELECT COUNT(*) FROM posts WHERE author_id = $1")
            .bind(author_id)
            .fetch_one(&mut tx)
            .await?;
    tx.commit().await?;
    Ok(count)
}

pub async fn insert_post(
    pool: &SqlitePool,
    author_id: i64,
    text: &str,
    group_id: Option<i64>,
    image: Option<&str>,
) -> Result<i64, RequestError> {
    let mut tx = pool.begin().await?;
    let id = sqlx::query_scalar::<Sqlite, i64>(
        r#"
        INSERT INTO posts (text, author_id, group_id, image)
        VALUES ($1, $2, $3, $4)
        RETURNING id
        "#,
    )
    .bind(text)
    .bind(author_id)
    .bind(group_id)
    .bind(image)
    .fetch_one(&mut tx)
    .await?;
    tx.commit().await?;
    Ok(id)
}

/// Updates the editable fields only; `author_id` and `pub_date` are never
/// touched after creation.
pub async fn update_post(
    pool: &SqlitePool,
    post_id: i64,
    text: &str,
    group_id: Option<i64>,
    image: Option<&str>,
) -> Result<(), RequestError> {
    let mut tx = pool.begin().await?;
    sqlx::query("UPDATE posts SET text = $1, group_id = $2, image = $3 WHERE id = $4")
        .bind(text)
        .bind(group_id)
        .bind(image)
        .bind(post_id)
        .execute(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(())
}

/// Admin/teardown capability; no handler deletes posts.
#[allow(dead_code)]
pub async fn delete_post(pool: &SqlitePool, post_id: i64) -> Result<(), RequestError> {
    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM posts WHERE id = $1")
        .bind(post_id)
        .execute(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(())
}
