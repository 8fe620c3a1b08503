use std::sync::Arc;

use crate::{
    db::{MemberRepository, PostRepository},
    error::{AppError, AppResult},
    models::{CreatePostRequest, NewPost, PostInfo, PostList, PostWithTags, UpdatePostRequest},
    services::{
        providers::TagRecommender,
        storage::{DeleteOutcome, ObjectStorage, UploadFile},
    },
};

/// Storage directory for post images
pub const POST_IMAGE_DIR: &str = "post-images";

/// Post lifecycle: storage of images, persistence and automatic tagging
///
/// Tags are recommended before anything is written. The post row and its tag
/// links are then written in one repository transaction. An image uploaded for
/// a write that fails is deleted again, and a replaced image is only deleted
/// once the write has committed.
#[derive(Clone)]
pub struct PostService {
    members: Arc<dyn MemberRepository>,
    posts: Arc<dyn PostRepository>,
    tag_recommender: Arc<dyn TagRecommender>,
    storage: Arc<dyn ObjectStorage>,
}

impl PostService {
    pub fn new(
        members: Arc<dyn MemberRepository>,
        posts: Arc<dyn PostRepository>,
        tag_recommender: Arc<dyn TagRecommender>,
        storage: Arc<dyn ObjectStorage>,
    ) -> Self {
        Self {
            members,
            posts,
            tag_recommender,
            storage,
        }
    }

    pub async fn create_post(
        &self,
        request: CreatePostRequest,
        image: Option<UploadFile>,
    ) -> AppResult<PostInfo> {
        validate_text(&request.title, &request.contents)?;

        self.members
            .find_member(request.member_id)
            .await?
            .ok_or(AppError::MemberNotFound(request.member_id))?;

        let tags = self
            .tag_recommender
            .recommend_tags(&request.contents)
            .await?;

        let image_url = self.upload_image(image).await?;

        let new_post = NewPost {
            member_id: request.member_id,
            title: request.title,
            contents: request.contents,
            image_url: image_url.clone(),
        };

        let inserted = self.posts.insert_post(&new_post, &tags).await;
        let saved = self.discard_on_error(inserted, image_url.as_deref()).await?;

        tracing::info!(
            post_id = saved.post.id,
            member_id = saved.post.member_id,
            tags = saved.tags.len(),
            "Post created"
        );

        Ok(PostInfo::from(saved))
    }

    pub async fn list_posts_by_member(&self, member_id: i64) -> AppResult<PostList> {
        self.members
            .find_member(member_id)
            .await?
            .ok_or(AppError::MemberNotFound(member_id))?;

        let posts = self.posts.find_posts_by_member(member_id).await?;

        Ok(PostList {
            posts: posts.into_iter().map(PostInfo::from).collect(),
        })
    }

    /// Replaces the text, optionally the image, and regenerates tags
    ///
    /// A new image is uploaded before the write; the previous one is deleted after it.
    pub async fn update_post(
        &self,
        post_id: i64,
        request: UpdatePostRequest,
        image: Option<UploadFile>,
    ) -> AppResult<PostInfo> {
        validate_text(&request.title, &request.contents)?;

        let PostWithTags { mut post, .. } = self
            .posts
            .find_post_with_tags(post_id)
            .await?
            .ok_or(AppError::PostNotFound(post_id))?;

        let tag_names = self
            .tag_recommender
            .recommend_tags(&request.contents)
            .await?;

        let new_url = self.upload_image(image).await?;
        let replaced_url = match &new_url {
            Some(url) => post.image_url.replace(url.clone()),
            None => None,
        };

        post.title = request.title;
        post.contents = request.contents;

        let updated = self.posts.update_post(&post, &tag_names).await;
        let tags = self.discard_on_error(updated, new_url.as_deref()).await?;

        self.delete_image(replaced_url.as_deref()).await;

        tracing::info!(post_id, tags = tags.len(), "Post updated");

        Ok(PostInfo::from(PostWithTags { post, tags }))
    }

    /// Drops the post's image, replaces the text and regenerates tags
    pub async fn remove_post_image(
        &self,
        post_id: i64,
        request: UpdatePostRequest,
    ) -> AppResult<PostInfo> {
        validate_text(&request.title, &request.contents)?;

        let PostWithTags { mut post, .. } = self
            .posts
            .find_post_with_tags(post_id)
            .await?
            .ok_or(AppError::PostNotFound(post_id))?;

        let tag_names = self
            .tag_recommender
            .recommend_tags(&request.contents)
            .await?;

        let old_url = post.image_url.take();
        post.title = request.title;
        post.contents = request.contents;

        let tags = self.posts.update_post(&post, &tag_names).await?;

        self.delete_image(old_url.as_deref()).await;

        tracing::info!(post_id, "Post image removed");

        Ok(PostInfo::from(PostWithTags { post, tags }))
    }

    pub async fn delete_post(&self, post_id: i64) -> AppResult<()> {
        let post = self
            .posts
            .find_post(post_id)
            .await?
            .ok_or(AppError::PostNotFound(post_id))?;

        self.delete_image(post.image_url.as_deref()).await;
        self.posts.delete_post(post_id).await?;

        tracing::info!(post_id, "Post deleted");

        Ok(())
    }

    async fn upload_image(&self, image: Option<UploadFile>) -> AppResult<Option<String>> {
        match image {
            Some(file) if !file.is_empty() => {
                let url = self.storage.upload(file, POST_IMAGE_DIR).await?;
                Ok(Some(url))
            }
            _ => Ok(None),
        }
    }

    async fn delete_image(&self, url: Option<&str>) -> DeleteOutcome {
        match url {
            Some(url) if !url.is_empty() => self.storage.delete(url).await,
            _ => DeleteOutcome::Skipped,
        }
    }

    /// Deletes a freshly uploaded image when the write it belonged to failed
    async fn discard_on_error<T>(
        &self,
        result: AppResult<T>,
        uploaded: Option<&str>,
    ) -> AppResult<T> {
        let Err(e) = &result else {
            return result;
        };

        if let Some(url) = uploaded {
            tracing::warn!(url = %url, error = %e, "Post write failed, discarding uploaded image");
            self.delete_image(Some(url)).await;
        }
        result
    }
}

fn validate_text(title: &str, contents: &str) -> AppResult<()> {
    if title.trim().is_empty() {
        return Err(AppError::InvalidInput("Post title cannot be empty".to_string()));
    }
    if contents.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "Post contents cannot be empty".to_string(),
        ));
    }
    Ok(())
}
