//! Repository traits for members, posts and tags, and their Postgres implementation.
//!
//! Post/tag links live in the `post_tags` association table; nothing here keeps
//! back-references between posts and their link rows.

use std::collections::HashMap;

use sqlx::{FromRow, PgConnection, PgPool};

use crate::{
    error::AppResult,
    models::{normalize_tag_names, CreateMember, Member, NewPost, Post, PostWithTags, Tag},
};

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MemberRepository: Send + Sync {
    async fn find_member(&self, id: i64) -> AppResult<Option<Member>>;

    async fn create_member(&self, request: &CreateMember) -> AppResult<Member>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait PostRepository: Send + Sync {
    async fn find_post(&self, id: i64) -> AppResult<Option<Post>>;

    /// Loads a post with its tags in link order
    async fn find_post_with_tags(&self, id: i64) -> AppResult<Option<PostWithTags>>;

    async fn find_posts_by_member(&self, member_id: i64) -> AppResult<Vec<PostWithTags>>;

    /// Inserts a post and links it to `tags` in one transaction
    ///
    /// Tags are looked up by name and created when missing.
    async fn insert_post(&self, post: &NewPost, tags: &[String]) -> AppResult<PostWithTags>;

    /// Persists title, contents and image URL of an existing post and replaces
    /// every tag link with `tags`, all in one transaction
    async fn update_post(&self, post: &Post, tags: &[String]) -> AppResult<Vec<Tag>>;

    /// Deletes a post; its tag links are removed by cascade
    async fn delete_post(&self, id: i64) -> AppResult<()>;
}

/// Postgres-backed implementation of both repository traits
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

#[derive(FromRow)]
struct PostTagRow {
    post_id: i64,
    id: i64,
    name: String,
}

const POST_COLUMNS: &str = "id, member_id, title, contents, image_url, created_at, updated_at";

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn tags_for_posts(&self, post_ids: &[i64]) -> AppResult<HashMap<i64, Vec<Tag>>> {
        if post_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<PostTagRow> = sqlx::query_as(
            r#"
            SELECT pt.post_id, t.id, t.name
            FROM post_tags pt
            JOIN tags t ON t.id = pt.tag_id
            WHERE pt.post_id = ANY($1)
            ORDER BY pt.post_id, pt.position
            "#,
        )
        .bind(post_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut tags: HashMap<i64, Vec<Tag>> = HashMap::new();
        for row in rows {
            tags.entry(row.post_id).or_default().push(Tag {
                id: row.id,
                name: row.name,
            });
        }

        Ok(tags)
    }
}

#[async_trait::async_trait]
impl MemberRepository for PgStore {
    async fn find_member(&self, id: i64) -> AppResult<Option<Member>> {
        let member = sqlx::query_as::<_, Member>(
            "SELECT id, name, email, created_at FROM members WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(member)
    }

    async fn create_member(&self, request: &CreateMember) -> AppResult<Member> {
        let member = sqlx::query_as::<_, Member>(
            r#"
            INSERT INTO members (name, email)
            VALUES ($1, $2)
            RETURNING id, name, email, created_at
            "#,
        )
        .bind(request.name.trim())
        .bind(request.email.trim())
        .fetch_one(&self.pool)
        .await?;

        Ok(member)
    }
}

#[async_trait::async_trait]
impl PostRepository for PgStore {
    async fn find_post(&self, id: i64) -> AppResult<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(&format!(
            "SELECT {} FROM posts WHERE id = $1",
            POST_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    async fn find_post_with_tags(&self, id: i64) -> AppResult<Option<PostWithTags>> {
        let Some(post) = self.find_post(id).await? else {
            return Ok(None);
        };

        let tags = self
            .tags_for_posts(&[post.id])
            .await?
            .remove(&post.id)
            .unwrap_or_default();

        Ok(Some(PostWithTags { post, tags }))
    }

    async fn find_posts_by_member(&self, member_id: i64) -> AppResult<Vec<PostWithTags>> {
        let posts = sqlx::query_as::<_, Post>(&format!(
            "SELECT {} FROM posts WHERE member_id = $1 ORDER BY id",
            POST_COLUMNS
        ))
        .bind(member_id)
        .fetch_all(&self.pool)
        .await?;

        let ids: Vec<i64> = posts.iter().map(|p| p.id).collect();
        let mut tags = self.tags_for_posts(&ids).await?;

        Ok(posts
            .into_iter()
            .map(|post| {
                let tags = tags.remove(&post.id).unwrap_or_default();
                PostWithTags { post, tags }
            })
            .collect())
    }

    async fn insert_post(&self, post: &NewPost, tags: &[String]) -> AppResult<PostWithTags> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query_as::<_, Post>(&format!(
            r#"
            INSERT INTO posts (member_id, title, contents, image_url)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            POST_COLUMNS
        ))
        .bind(post.member_id)
        .bind(&post.title)
        .bind(&post.contents)
        .bind(&post.image_url)
        .fetch_one(&mut *tx)
        .await?;

        let tags = replace_post_tags(&mut tx, inserted.id, tags).await?;

        tx.commit().await?;

        Ok(PostWithTags {
            post: inserted,
            tags,
        })
    }

    async fn update_post(&self, post: &Post, tags: &[String]) -> AppResult<Vec<Tag>> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            UPDATE posts
            SET title = $2, contents = $3, image_url = $4, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(post.id)
        .bind(&post.title)
        .bind(&post.contents)
        .bind(&post.image_url)
        .execute(&mut *tx)
        .await?;

        let tags = replace_post_tags(&mut tx, post.id, tags).await?;

        tx.commit().await?;

        Ok(tags)
    }

    async fn delete_post(&self, id: i64) -> AppResult<()> {
        sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

/// Clears a post's tag links and links it to `names`, find-or-creating each tag
///
/// Runs on the caller's connection so it joins the caller's transaction.
async fn replace_post_tags(
    conn: &mut PgConnection,
    post_id: i64,
    names: &[String],
) -> AppResult<Vec<Tag>> {
    sqlx::query("DELETE FROM post_tags WHERE post_id = $1")
        .bind(post_id)
        .execute(&mut *conn)
        .await?;

    let mut tags = Vec::new();
    for (position, name) in normalize_tag_names(names).into_iter().enumerate() {
        // DO UPDATE so RETURNING also yields the existing row
        let tag = sqlx::query_as::<_, Tag>(
            r#"
            INSERT INTO tags (name) VALUES ($1)
            ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
            RETURNING id, name
            "#,
        )
        .bind(&name)
        .fetch_one(&mut *conn)
        .await?;

        sqlx::query(
            "INSERT INTO post_tags (post_id, tag_id, position) VALUES ($1, $2, $3) ON CONFLICT DO NOTHING",
        )
        .bind(post_id)
        .bind(tag.id)
        .bind(position as i32)
        .execute(&mut *conn)
        .await?;

        tags.push(tag);
    }

    tracing::debug!(post_id, tag_count = tags.len(), "Post tags replaced");

    Ok(tags)
}
