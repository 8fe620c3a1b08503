//! Object storage for post images.
//!
//! Uploads go to `{directory}/{uuid}_{file name}` and return a public URL with the
//! key percent-encoded. Deletes take that URL back, decode the key from its path and
//! never fail the caller.

use aws_sdk_s3::{
    config::{BehaviorVersion, Region},
    error::DisplayErrorContext,
    primitives::ByteStream,
    Client as S3Client,
};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use url::Url;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// A file received from a client, fully buffered
#[derive(Debug, Clone, PartialEq)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Result of a best-effort delete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// Nothing to delete: no URL, or no key could be derived from it
    Skipped,
    /// The backend rejected the delete; already logged
    Failed,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Stores the file under `directory` and returns its public URL
    async fn upload(&self, file: UploadFile, directory: &str) -> AppResult<String>;

    /// Deletes the object behind `url`. Failures are logged, never returned.
    async fn delete(&self, url: &str) -> DeleteOutcome;
}

/// Characters escaped in each path segment of a public object URL
const KEY_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Builds `{directory}/{uuid}_{file name}`, keeping the file name as given
pub fn build_object_key(directory: &str, file_name: &str) -> String {
    format!(
        "{}/{}_{}",
        directory.trim_matches('/'),
        Uuid::new_v4(),
        file_name
    )
}

/// Percent-encodes each `/`-separated segment of an object key
fn encode_key(key: &str) -> String {
    key.split('/')
        .map(|segment| utf8_percent_encode(segment, KEY_SEGMENT).to_string())
        .collect::<Vec<_>>()
        .join("/")
}

/// S3-backed object storage
#[derive(Clone)]
pub struct S3Storage {
    client: S3Client,
    bucket: String,
    public_base_url: String,
}

impl S3Storage {
    pub fn new(client: S3Client, bucket: String, public_base_url: String) -> Self {
        Self {
            client,
            bucket,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Builds a client from the default AWS credential chain
    pub async fn connect(bucket: String, region: String, public_url: Option<String>) -> Self {
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.clone()))
            .load()
            .await;

        let public_base_url =
            public_url.unwrap_or_else(|| format!("https://{}.s3.{}.amazonaws.com", bucket, region));

        tracing::info!(bucket = %bucket, base_url = %public_base_url, "Object storage configured");

        Self::new(S3Client::new(&sdk_config), bucket, public_base_url)
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url, encode_key(key))
    }

    /// Derives the object key from a URL's path
    ///
    /// The leading slash is dropped, as is any path prefix of the public base URL
    /// (path-style endpoints put the bucket there). The rest is percent-decoded.
    pub fn key_from_url(&self, url: &str) -> Option<String> {
        let parsed = match Url::parse(url) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::error!(url = %url, error = %e, "Invalid object URL");
                return None;
            }
        };

        let base_path = Url::parse(&self.public_base_url)
            .map(|base| base.path().trim_matches('/').to_string())
            .unwrap_or_default();

        let path = parsed.path().trim_start_matches('/');
        let key = if base_path.is_empty() {
            path
        } else {
            path.strip_prefix(base_path.as_str())
                .and_then(|rest| rest.strip_prefix('/'))
                .unwrap_or(path)
        };

        if key.is_empty() {
            return None;
        }

        match percent_decode_str(key).decode_utf8() {
            Ok(decoded) => Some(decoded.into_owned()),
            Err(e) => {
                tracing::error!(url = %url, error = %e, "Object URL path is not valid UTF-8");
                None
            }
        }
    }
}

#[async_trait::async_trait]
impl ObjectStorage for S3Storage {
    async fn upload(&self, file: UploadFile, directory: &str) -> AppResult<String> {
        let key = build_object_key(directory, &file.file_name);
        let size = file.bytes.len();
        let content_type = file
            .content_type
            .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .content_length(size as i64)
            .content_type(content_type)
            .body(ByteStream::from(file.bytes))
            .send()
            .await
            .map_err(|e| {
                tracing::error!(key = %key, error = %DisplayErrorContext(&e), "Object upload failed");
                AppError::S3UploadFail(format!("Failed to store {}", key))
            })?;

        tracing::info!(key = %key, size, "Object uploaded");

        Ok(self.object_url(&key))
    }

    async fn delete(&self, url: &str) -> DeleteOutcome {
        if url.trim().is_empty() {
            tracing::warn!("Object URL is empty, skipping delete");
            return DeleteOutcome::Skipped;
        }

        let Some(key) = self.key_from_url(url) else {
            tracing::warn!(url = %url, "Could not derive object key from URL, skipping delete");
            return DeleteOutcome::Skipped;
        };

        match self
            .client
            .delete_object()
            .bucket(&self.bucket)
            .key(&key)
            .send()
            .await
        {
            Ok(_) => {
                tracing::info!(key = %key, "Object deleted");
                DeleteOutcome::Deleted
            }
            Err(e) => {
                tracing::error!(
                    key = %key,
                    url = %url,
                    error = %DisplayErrorContext(&e),
                    "Object delete failed"
                );
                DeleteOutcome::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_storage(public_base_url: &str) -> S3Storage {
        let config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("ap-northeast-2"))
            .build();

        S3Storage::new(
            S3Client::from_conf(config),
            "cinepost".to_string(),
            public_base_url.to_string(),
        )
    }

    #[test]
    fn test_build_object_key_layout() {
        let key = build_object_key("post-images", "poster.png");
        let (dir, rest) = key.split_once('/').unwrap();
        let (uuid, name) = rest.split_once('_').unwrap();

        assert_eq!(dir, "post-images");
        assert!(Uuid::parse_str(uuid).is_ok());
        assert_eq!(name, "poster.png");
    }

    #[test]
    fn test_build_object_key_is_unique() {
        let a = build_object_key("post-images", "a.png");
        let b = build_object_key("post-images", "a.png");
        assert_ne!(a, b);
    }

    #[test]
    fn test_build_object_key_keeps_original_file_name() {
        let key = build_object_key("post-images/", "포스터 최종.png");
        assert!(key.starts_with("post-images/"));
        assert!(key.ends_with("_포스터 최종.png"));
    }

    #[test]
    fn test_object_url_is_percent_encoded() {
        let storage = create_test_storage("https://cinepost.s3.ap-northeast-2.amazonaws.com");
        let url = storage.object_url("post-images/abc_포스터 #1.png");
        assert_eq!(
            url,
            "https://cinepost.s3.ap-northeast-2.amazonaws.com/post-images/abc_%ED%8F%AC%EC%8A%A4%ED%84%B0%20%231.png"
        );
        assert!(Url::parse(&url).is_ok());
    }

    #[test]
    fn test_non_ascii_key_round_trips_through_url() {
        let storage = create_test_storage("http://localhost:9000/cinepost");
        let key = build_object_key("post-images", "기생충 포스터?.png");
        let url = storage.object_url(&key);
        assert_eq!(storage.key_from_url(&url), Some(key));
    }

    #[test]
    fn test_key_from_virtual_hosted_url() {
        let storage = create_test_storage("https://cinepost.s3.ap-northeast-2.amazonaws.com");
        let key = storage.key_from_url(
            "https://cinepost.s3.ap-northeast-2.amazonaws.com/post-images/abc_poster.png",
        );
        assert_eq!(key.as_deref(), Some("post-images/abc_poster.png"));
    }

    #[test]
    fn test_key_from_path_style_url() {
        let storage = create_test_storage("http://localhost:9000/cinepost/");
        let key = storage.key_from_url("http://localhost:9000/cinepost/post-images/abc_a.png");
        assert_eq!(key.as_deref(), Some("post-images/abc_a.png"));
    }

    #[test]
    fn test_key_from_invalid_url() {
        let storage = create_test_storage("https://cinepost.s3.ap-northeast-2.amazonaws.com");
        assert_eq!(storage.key_from_url("not a url"), None);
        assert_eq!(
            storage.key_from_url("https://cinepost.s3.ap-northeast-2.amazonaws.com/"),
            None
        );
    }

    #[test]
    fn test_object_url_round_trips_to_key() {
        let storage = create_test_storage("https://cinepost.s3.ap-northeast-2.amazonaws.com/");
        let key = build_object_key("post-images", "still.jpg");
        let url = storage.object_url(&key);
        assert_eq!(storage.key_from_url(&url), Some(key));
    }

    #[tokio::test]
    async fn test_delete_with_empty_url_is_skipped() {
        let storage = create_test_storage("https://cinepost.s3.ap-northeast-2.amazonaws.com");
        assert_eq!(storage.delete("").await, DeleteOutcome::Skipped);
        assert_eq!(storage.delete("   ").await, DeleteOutcome::Skipped);
    }

    #[tokio::test]
    async fn test_delete_with_unparseable_url_is_skipped() {
        let storage = create_test_storage("https://cinepost.s3.ap-northeast-2.amazonaws.com");
        assert_eq!(storage.delete("::::").await, DeleteOutcome::Skipped);
    }
}
