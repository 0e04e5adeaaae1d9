use serde::Serialize;

use crate::models::{Comment, Group, Post};
use crate::pagination::Page;

use super::{FieldError, PostForm};

#[derive(Serialize, Debug)]
pub struct GroupView {
    pub title: String,
    pub slug: String,
    pub description: String,
}

impl From<Group> for GroupView {
    fn from(
        Group {
            title,
            slug,
            description,
            ..
        }: Group,
    ) -> Self {
        GroupView {
            title,
            slug,
            description,
        }
    }
}

#[derive(Serialize, Debug)]
pub struct GroupRef {
    pub slug: String,
    pub title: String,
}

#[derive(Serialize, Debug)]
pub struct PostView {
    pub id: i64,
    pub text: String,
    pub pub_date: String,
    pub author: String,
    pub group: Option<GroupRef>,
    pub image: Option<String>,
}

impl From<Post> for PostView {
    fn from(post: Post) -> Self {
        let group = match (post.group_slug, post.group_title) {
            (Some(slug), Some(title)) => Some(GroupRef { slug, title }),
            _ => None,
        };
        PostView {
            id: post.id,
            text: post.text,
            pub_date: post.pub_date.to_string(),
            author: post.author_username,
            group,
            image: post.image,
        }
    }
}

#[derive(Serialize, Debug)]
pub struct CommentView {
    pub id: i64,
    pub author: String,
    pub text: String,
    pub created: String,
}

impl From<Comment> for CommentView {
    fn from(comment: Comment) -> Self {
        CommentView {
            id: comment.id,
            author: comment.author_username,
            text: comment.text,
            created: comment.created.to_string(),
        }
    }
}

// ----------------- Page View Models -----------------

#[derive(Serialize, Debug)]
pub struct FeedResponse {
    pub page: Page<PostView>,
    pub post_trunc: usize,
}

#[derive(Serialize, Debug)]
pub struct GroupFeedResponse {
    pub group: GroupView,
    pub page: Page<PostView>,
    pub post_trunc: usize,
}

#[derive(Serialize, Debug)]
pub struct ProfileResponse {
    pub author: String,
    pub posts_count: i64,
    /// `None` when the viewer is anonymous or is looking at their own
    /// profile; otherwise whether the viewer follows this author.
    pub following: Option<bool>,
    pub page: Page<PostView>,
    pub post_trunc: usize,
}

#[derive(Serialize, Debug)]
pub struct PostDetailResponse {
    pub post: PostView,
    pub posts_count: i64,
    pub comments: Vec<CommentView>,
}

/// The create/edit form view model. On a failed submission the submitted
/// input is echoed back in `form` alongside the field errors.
#[derive(Serialize, Debug)]
pub struct PostFormResponse {
    pub form: PostForm,
    pub groups: Vec<GroupView>,
    pub is_edit: bool,
    pub errors: Vec<FieldError>,
}

#[derive(Serialize, Debug)]
pub struct AuthResponse {
    pub username: String,
    pub token: String,
}
