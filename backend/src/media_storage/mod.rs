//! S3-backed content store for normalized images and result records
mod error;

use std::sync::Arc;
use std::time::Duration;

use aws_sdk_s3::{
    error::SdkError, operation::head_object::HeadObjectError, presigning::PresigningConfig,
    primitives::ByteStream, Client as S3Client,
};
use chrono::{DateTime, Utc};

pub use error::{BucketError, BucketResult};

/// Presigned URL with expiration information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresignedUrl {
    /// The presigned URL for GET operations
    pub url: String,
    /// ISO-8601 UTC timestamp when the URL expires
    pub expires_at: DateTime<Utc>,
}

/// Object store operations the upload pipeline consumes
#[async_trait::async_trait]
pub trait ContentStore: Send + Sync {
    /// Writes `body` under `key`, tagged with `content_type`
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: &[u8],
        content_type: &str,
    ) -> BucketResult<()>;

    /// Whether an object exists under `key`
    async fn object_exists(&self, bucket: &str, key: &str) -> BucketResult<bool>;

    /// Issues a time-limited read URL for `key`
    async fn presigned_get_url(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> BucketResult<PresignedUrl>;

    /// Lightweight reachability check for `bucket`
    async fn check_bucket_reachable(&self, bucket: &str) -> BucketResult<()>;
}

/// Interprets a `HeadObject` outcome: `NotFound` means absent, any other error is a failure
fn existence_from_head<T>(result: Result<T, SdkError<HeadObjectError>>) -> BucketResult<bool> {
    match result {
        Ok(_) => Ok(true),
        Err(SdkError::ServiceError(service_err))
            if matches!(service_err.err(), HeadObjectError::NotFound(_)) =>
        {
            Ok(false)
        }
        Err(e) => Err(BucketError::from(e)),
    }
}

/// Content store client for S3 operations
pub struct MediaStorage {
    s3_client: Arc<S3Client>,
}

impl MediaStorage {
    /// Creates a new media storage client
    ///
    /// # Arguments
    ///
    /// * `s3_client` - Pre-configured S3 client
    #[must_use]
    pub const fn new(s3_client: Arc<S3Client>) -> Self {
        Self { s3_client }
    }
}

#[async_trait::async_trait]
impl ContentStore for MediaStorage {
    /// Uploads a buffer in a single `PutObject` call
    ///
    /// # Errors
    ///
    /// Returns `BucketError::S3Error` when S3 rejects the write
    /// Returns `BucketError::AwsError` when S3 cannot be reached
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: &[u8],
        content_type: &str,
    ) -> BucketResult<()> {
        self.s3_client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body.to_vec()))
            .content_type(content_type)
            .send()
            .await?;

        tracing::debug!(bucket, key, bytes = body.len(), "stored object");
        Ok(())
    }

    /// Checks if an object exists in the bucket
    ///
    /// # Returns
    ///
    /// * `Ok(true)` if object exists
    /// * `Ok(false)` if object does not exist
    /// * `Err(BucketError)` if S3 operation fails
    ///
    /// # Errors
    ///
    /// Returns `BucketError::S3Error` for S3 service errors
    /// Returns `BucketError::UpstreamError` for 5xx errors
    async fn object_exists(&self, bucket: &str, key: &str) -> BucketResult<bool> {
        let result = self
            .s3_client
            .head_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await;

        existence_from_head(result)
    }

    /// Generates a presigned URL for GET operations
    ///
    /// # Errors
    ///
    /// Returns `BucketError::ConfigError` if presigning config creation fails
    /// Returns `BucketError::S3Error` if presigned URL generation fails
    async fn presigned_get_url(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> BucketResult<PresignedUrl> {
        let presigned_config = PresigningConfig::expires_in(expires_in).map_err(|e| {
            BucketError::ConfigError(format!("Failed to create presigning config: {e}"))
        })?;

        let presigned_request = self
            .s3_client
            .get_object()
            .bucket(bucket)
            .key(key)
            .presigned(presigned_config)
            .await?;

        Ok(PresignedUrl {
            url: presigned_request.uri().to_string(),
            expires_at: Utc::now() + expires_in,
        })
    }

    async fn check_bucket_reachable(&self, bucket: &str) -> BucketResult<()> {
        self.s3_client.head_bucket().bucket(bucket).send().await?;
        Ok(())
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub mod mock {
    //! In-memory content store for tests

    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;
    use std::time::Duration;

    use chrono::Utc;

    use super::{BucketError, BucketResult, ContentStore, PresignedUrl};

    /// An object captured by [`InMemoryContentStore`]
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct StoredObject {
        /// Object body
        pub body: Vec<u8>,
        /// Content type the object was written with
        pub content_type: String,
    }

    #[derive(Default)]
    struct Inner {
        objects: HashMap<(String, String), StoredObject>,
        unreachable_buckets: HashSet<String>,
        offline_buckets: HashSet<String>,
        failing_put_buckets: HashSet<String>,
        failing_presign_buckets: HashSet<String>,
        calls: usize,
    }

    /// Thread-safe in-memory store with per-bucket failure injection
    #[derive(Default)]
    pub struct InMemoryContentStore {
        inner: Mutex<Inner>,
    }

    impl InMemoryContentStore {
        /// Creates an empty store where every bucket is reachable
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        fn inner(&self) -> std::sync::MutexGuard<'_, Inner> {
            self.inner.lock().expect("mock store mutex poisoned")
        }

        /// Makes every call against `bucket` fail as if S3 rejected it
        pub fn make_unreachable(&self, bucket: &str) {
            self.inner().unreachable_buckets.insert(bucket.to_string());
        }

        /// Makes every call against `bucket` fail as if S3 could not be contacted
        pub fn take_offline(&self, bucket: &str) {
            self.inner().offline_buckets.insert(bucket.to_string());
        }

        /// Makes writes to `bucket` fail with an access-denied error
        pub fn fail_puts_to(&self, bucket: &str) {
            self.inner().failing_put_buckets.insert(bucket.to_string());
        }

        /// Makes link requests for `bucket` fail as if signing were refused
        pub fn fail_presigns_for(&self, bucket: &str) {
            self.inner()
                .failing_presign_buckets
                .insert(bucket.to_string());
        }

        /// Seeds an object
        pub fn insert(&self, bucket: &str, key: &str, body: &[u8], content_type: &str) {
            self.inner().objects.insert(
                (bucket.to_string(), key.to_string()),
                StoredObject {
                    body: body.to_vec(),
                    content_type: content_type.to_string(),
                },
            );
        }

        /// Returns the object stored under `bucket`/`key`, if any
        #[must_use]
        pub fn get(&self, bucket: &str, key: &str) -> Option<StoredObject> {
            self.inner()
                .objects
                .get(&(bucket.to_string(), key.to_string()))
                .cloned()
        }

        /// Keys stored in `bucket`, sorted
        #[must_use]
        pub fn keys(&self, bucket: &str) -> Vec<String> {
            let mut keys: Vec<String> = self
                .inner()
                .objects
                .keys()
                .filter(|(b, _)| b == bucket)
                .map(|(_, k)| k.clone())
                .collect();
            keys.sort();
            keys
        }

        /// Number of store operations attempted so far
        #[must_use]
        pub fn call_count(&self) -> usize {
            self.inner().calls
        }

        fn enter(&self, bucket: &str) -> BucketResult<()> {
            let mut inner = self.inner();
            inner.calls += 1;
            if inner.offline_buckets.contains(bucket) {
                return Err(BucketError::AwsError(format!(
                    "dispatch failure: could not connect to bucket {bucket}"
                )));
            }
            if inner.unreachable_buckets.contains(bucket) {
                return Err(BucketError::S3Error(format!(
                    "The specified bucket does not exist: {bucket}"
                )));
            }
            Ok(())
        }
    }

    #[async_trait::async_trait]
    impl ContentStore for InMemoryContentStore {
        async fn put_object(
            &self,
            bucket: &str,
            key: &str,
            body: &[u8],
            content_type: &str,
        ) -> BucketResult<()> {
            self.enter(bucket)?;
            if self.inner().failing_put_buckets.contains(bucket) {
                return Err(BucketError::S3Error("Access Denied".to_string()));
            }
            self.insert(bucket, key, body, content_type);
            Ok(())
        }

        async fn object_exists(&self, bucket: &str, key: &str) -> BucketResult<bool> {
            self.enter(bucket)?;
            Ok(self.get(bucket, key).is_some())
        }

        async fn presigned_get_url(
            &self,
            bucket: &str,
            key: &str,
            expires_in: Duration,
        ) -> BucketResult<PresignedUrl> {
            self.enter(bucket)?;
            if self.inner().failing_presign_buckets.contains(bucket) {
                return Err(BucketError::ConfigError(
                    "Failed to create presigning config: credentials unavailable".to_string(),
                ));
            }
            Ok(PresignedUrl {
                url: format!(
                    "https://{bucket}.s3.mock.local/{key}?X-Amz-Expires={}",
                    expires_in.as_secs()
                ),
                expires_at: Utc::now() + expires_in,
            })
        }

        async fn check_bucket_reachable(&self, bucket: &str) -> BucketResult<()> {
            self.enter(bucket)
        }
    }
}
