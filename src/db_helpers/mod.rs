mod comment_helpers;
mod follow_helpers;
mod group_helpers;
mod post_helpers;
mod user_helpers;

pub use comment_helpers::*;
pub use follow_helpers::*;
pub use group_helpers::*;
pub use post_helpers::*;
pub use user_helpers::*;

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;
    use sqlx::{Sqlite, SqlitePool};

    async fn test_pool() -> SqlitePool {
        // A single connection keeps the in-memory database alive for the
        // whole test.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::query("PRAGMA foreign_keys = ON")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();
        pool
    }

    async fn make_user(pool: &SqlitePool, username: &str) -> i64 {
        insert_user(pool, username, &format!("{username}@example.com"), "hash")
            .await
            .unwrap()
    }

    async fn follow_count(pool: &SqlitePool, user_id: i64, author_id: i64) -> i64 {
        sqlx::query_scalar::<Sqlite, i64>(
            "SELECT COUNT(*) FROM follows WHERE user_id = $1 AND author_id = $2",
        )
        .bind(user_id)
        .bind(author_id)
        .fetch_one(pool)
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn following_twice_creates_a_single_edge() {
        let pool = test_pool().await;
        let u1 = make_user(&pool, "u1").await;
        make_user(&pool, "u2").await;

        follow_author_in_db(&pool, u1, "u2").await.unwrap();
        follow_author_in_db(&pool, u1, "u2").await.unwrap();

        let u2 = get_user_by_username(&pool, "u2").await.unwrap().unwrap();
        assert_eq!(follow_count(&pool, u1, u2.id).await, 1);
    }

    #[tokio::test]
    async fn self_follow_is_ignored() {
        let pool = test_pool().await;
        let u1 = make_user(&pool, "u1").await;

        follow_author_in_db(&pool, u1, "u1").await.unwrap();

        assert_eq!(follow_count(&pool, u1, u1).await, 0);
    }

    #[tokio::test]
    async fn unfollow_without_edge_is_a_noop() {
        let pool = test_pool().await;
        let u1 = make_user(&pool, "u1").await;
        let u2 = make_user(&pool, "u2").await;

        unfollow_author_in_db(&pool, u1, "u2").await.unwrap();
        assert_eq!(follow_count(&pool, u1, u2).await, 0);

        follow_author_in_db(&pool, u1, "u2").await.unwrap();
        unfollow_author_in_db(&pool, u1, "u2").await.unwrap();
        unfollow_author_in_db(&pool, u1, "u2").await.unwrap();
        assert_eq!(follow_count(&pool, u1, u2).await, 0);
    }

    #[tokio::test]
    async fn following_unknown_author_is_not_found() {
        let pool = test_pool().await;
        let u1 = make_user(&pool, "u1").await;

        let error = follow_author_in_db(&pool, u1, "nobody").await;
        assert!(matches!(
            error,
            Err(crate::errors::RequestError::NotFound)
        ));
    }

    #[tokio::test]
    async fn deleting_a_group_detaches_posts_without_deleting_them() {
        let pool = test_pool().await;
        let u1 = make_user(&pool, "u1").await;
        let group_id = insert_group(&pool, "Group", "g", "a group").await.unwrap();
        let post_id = insert_post(&pool, u1, "t1", Some(group_id), None)
            .await
            .unwrap();

        delete_group(&pool, group_id).await.unwrap();

        let post = get_post_by_id(&pool, post_id).await.unwrap().unwrap();
        assert_eq!(post.text, "t1");
        assert!(post.group_slug.is_none());
        assert!(post.group_title.is_none());
    }

    #[tokio::test]
    async fn deleting_a_post_removes_its_comments() {
        let pool = test_pool().await;
        let u1 = make_user(&pool, "u1").await;
        let post_id = insert_post(&pool, u1, "t1", None, None).await.unwrap();
        insert_comment(&pool, post_id, u1, "first").await.unwrap();
        insert_comment(&pool, post_id, u1, "second").await.unwrap();

        delete_post(&pool, post_id).await.unwrap();

        let remaining = sqlx::query_scalar::<Sqlite, i64>(
            "SELECT COUNT(*) FROM comments WHERE post_id = $1",
        )
        .bind(post_id)
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(remaining, 0);
    }

    #[tokio::test]
    async fn updating_a_post_preserves_author_and_pub_date() {
        let pool = test_pool().await;
        let u1 = make_user(&pool, "u1").await;
        let post_id = insert_post(&pool, u1, "before", None, None).await.unwrap();
        let before = get_post_by_id(&pool, post_id).await.unwrap().unwrap();

        update_post(&pool, post_id, "after", None, Some("img.png"))
            .await
            .unwrap();

        let after = get_post_by_id(&pool, post_id).await.unwrap().unwrap();
        assert_eq!(after.text, "after");
        assert_eq!(after.image.as_deref(), Some("img.png"));
        assert_eq!(after.author_id, before.author_id);
        assert_eq!(after.pub_date, before.pub_date);
    }

    #[tokio::test]
    async fn posts_are_listed_newest_first() {
        let pool = test_pool().await;
        let u1 = make_user(&pool, "u1").await;
        for text in ["first", "second", "third"] {
            insert_post(&pool, u1, text, None, None).await.unwrap();
        }

        let posts = list_all_posts(&pool).await.unwrap();
        let texts: Vec<&str> = posts.iter().map(|post| post.text.as_str()).collect();
        assert_eq!(texts, vec!["third", "second", "first"]);
    }

    #[tokio::test]
    async fn followed_posts_only_include_followed_authors() {
        let pool = test_pool().await;
        let u1 = make_user(&pool, "u1").await;
        let u2 = make_user(&pool, "u2").await;
        let u3 = make_user(&pool, "u3").await;
        insert_post(&pool, u2, "t2", None, None).await.unwrap();
        insert_post(&pool, u3, "t3", None, None).await.unwrap();

        follow_author_in_db(&pool, u1, "u2").await.unwrap();

        let feed = list_followed_posts(&pool, u1).await.unwrap();
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].text, "t2");

        let empty = list_followed_posts(&pool, u2).await.unwrap();
        assert!(empty.is_empty());
    }

    #[tokio::test]
    async fn recent_comments_are_limited_and_newest_first() {
        let pool = test_pool().await;
        let u1 = make_user(&pool, "u1").await;
        let post_id = insert_post(&pool, u1, "t1", None, None).await.unwrap();
        for n in 0..12 {
            insert_comment(&pool, post_id, u1, &format!("comment {n}"))
                .await
                .unwrap();
        }

        let comments = list_recent_comments(&pool, post_id, 10).await.unwrap();
        assert_eq!(comments.len(), 10);
        assert_eq!(comments[0].text, "comment 11");
        assert_eq!(comments[9].text, "comment 2");
    }
}
