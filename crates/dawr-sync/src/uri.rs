//! S3 URI parsing
//!
//! Format: s3://bucket/prefix/ or s3://bucket

use anyhow::{Context, Result};

/// Bucket and key prefix parsed from an `s3://` URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Uri {
    pub bucket: String,
    pub key: Option<String>,
}

impl S3Uri {
    /// Parse an S3 URI string
    pub fn parse(uri: &str) -> Result<Self> {
        let path = uri
            .strip_prefix("s3://")
            .with_context(|| format!("Invalid S3 URI: {}. Must start with s3://", uri))?;

        let (bucket, key) = match path.find('/') {
            Some(idx) => {
                let (b, k) = path.split_at(idx);
                let key = k.strip_prefix('/').unwrap_or(k);
                (
                    b.to_string(),
                    if key.is_empty() {
                        None
                    } else {
                        Some(key.to_string())
                    },
                )
            }
            None => (path.to_string(), None),
        };

        if bucket.is_empty() {
            anyhow::bail!("Invalid S3 URI: bucket name cannot be empty");
        }

        Ok(Self { bucket, key })
    }

    /// Get the key or empty string
    pub fn key_or_empty(&self) -> &str {
        self.key.as_deref().unwrap_or("")
    }
}

impl std::fmt::Display for S3Uri {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.key {
            Some(k) => write!(f, "s3://{}/{}", self.bucket, k),
            None => write!(f, "s3://{}", self.bucket),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_s3_uri() {
        let uri = S3Uri::parse("s3://mybucket").unwrap();
        assert_eq!(uri.bucket, "mybucket");
        assert!(uri.key.is_none());

        let uri = S3Uri::parse("s3://mybucket/").unwrap();
        assert_eq!(uri.bucket, "mybucket");
        assert!(uri.key.is_none());

        let uri = S3Uri::parse("s3://mybucket/lifecycle/prod/").unwrap();
        assert_eq!(uri.bucket, "mybucket");
        assert_eq!(uri.key, Some("lifecycle/prod/".to_string()));
        assert_eq!(uri.to_string(), "s3://mybucket/lifecycle/prod/");
    }

    #[test]
    fn test_invalid_s3_uri() {
        assert!(S3Uri::parse("mybucket").is_err());
        assert!(S3Uri::parse("http://mybucket").is_err());
        assert!(S3Uri::parse("s3:///prefix").is_err());
    }
}
