use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::Tag;

/// A row from the `posts` table
#[derive(Debug, Clone, FromRow, PartialEq)]
pub struct Post {
    pub id: i64,
    pub member_id: i64,
    pub title: String,
    pub contents: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A post together with the tags linked to it through `post_tags`
#[derive(Debug, Clone, PartialEq)]
pub struct PostWithTags {
    pub post: Post,
    pub tags: Vec<Tag>,
}

/// Values for inserting a new post
#[derive(Debug, Clone)]
pub struct NewPost {
    pub member_id: i64,
    pub title: String,
    pub contents: String,
    pub image_url: Option<String>,
}

/// Request body for creating a post
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub member_id: i64,
    pub title: String,
    pub contents: String,
}

/// Request body for updating a post's text
#[derive(Debug, Clone, Deserialize)]
pub struct UpdatePostRequest {
    pub title: String,
    pub contents: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PostInfo {
    pub post_id: i64,
    pub member_id: i64,
    pub title: String,
    pub contents: String,
    pub image_url: Option<String>,
    pub tags: Vec<String>,
}

impl From<PostWithTags> for PostInfo {
    fn from(value: PostWithTags) -> Self {
        let PostWithTags { post, tags } = value;
        Self {
            post_id: post.id,
            member_id: post.member_id,
            title: post.title,
            contents: post.contents,
            image_url: post.image_url,
            tags: tags.into_iter().map(|t| t.name).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PostList {
    pub posts: Vec<PostInfo>,
}
