use sqlx::{Sqlite, SqlitePool};

use crate::{errors::RequestError, models::Group};

const GROUP_QUERY: &str = "SELECT id, title, slug, description FROM groups";

pub async fn get_group_by_slug(
    pool: &SqlitePool,
    slug: &str,
) -> Result<Option<Group>, RequestError> {
    let mut tx = pool.begin().await?;
    let result = sqlx::query_as::<Sqlite, Group>(&format!("{GROUP_QUERY} WHERE slug = $1"))
        .bind(slug)
        .fetch_optional(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(result)
}

pub async fn list_groups(pool: &SqlitePool) -> Result<Vec<Group>, RequestError> {
    let mut tx = pool.begin().await?;
    let result = sqlx::query_as::<Sqlite, Group>(&format!("{GROUP_QUERY} ORDER BY id"))
        .fetch_all(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(result)
}

/// Groups are created out-of-band (admin/seed), not through a handler.
#[allow(dead_code)]
pub async fn insert_group(
    pool: &SqlitePool,
    title: &str,
    slug: &str,
    description: &str,
) -> Result<i64, RequestError> {
    let mut tx = pool.begin().await?;
    let id = sqlx::query_scalar::<Sqlite, i64>(
        r#"
        INSERT INTO groups (title, slug, description)
        VALUES ($1, $2, $3)
        RETURNING id
        "#,
    )
    .bind(title)
    .bind(slug)
    .bind(description)
    .fetch_one(&mut tx)
    .await?;
    tx.commit().await?;
    Ok(id)
}

/// Admin capability only; posts referencing the group keep living with
/// their group reference cleared.
#[allow(dead_code)]
pub async fn delete_group(pool: &SqlitePool, id: i64) -> Result<(), RequestError> {
    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM groups WHERE id = $1")
        .bind(id)
        .execute(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(())
}
