//! S3-compatible object store over HTTP.
//!
//! Talks to AWS S3 or any compatible service (MinIO, Ceph RGW, ...) with
//! SigV4-signed requests. Listing uses ListObjectsV2 with continuation tokens.

mod config;
mod signer;
mod xml;

pub use config::{Credentials, S3Config};

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Method, StatusCode};
use tracing::{debug, info, trace};

use crate::domain::StoreError;
use crate::ports::{ListPage, ObjectStore, PutOptions};
use signer::{CanonicalRequest, EMPTY_PAYLOAD_SHA256};

/// Maximum keys requested per listing page.
const MAX_KEYS: &str = "1000";

/// [`ObjectStore`] backed by an S3 bucket.
#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: reqwest::Client,
    config: S3Config,
    credentials: Credentials,
}

/// A request ready to sign and send.
struct Prepared {
    method: Method,
    url: String,
    host: String,
    uri: String,
    query: String,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl S3ObjectStore {
    /// Build a client. Credentials come from `config` or the environment.
    pub fn new(config: S3Config) -> Result<Self, StoreError> {
        let credentials = config
            .credentials
            .clone()
            .or_else(Credentials::from_env)
            .ok_or_else(|| {
                StoreError::AccessDenied(
                    "no credentials configured and AWS_ACCESS_KEY_ID/AWS_SECRET_ACCESS_KEY unset"
                        .to_string(),
                )
            })?;

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        info!(
            bucket = %config.bucket,
            region = %config.region,
            endpoint = config.endpoint.as_deref().unwrap_or("aws"),
            path_style = config.path_style,
            "S3 object store configured"
        );
        Ok(Self {
            client,
            config,
            credentials,
        })
    }

    pub fn bucket(&self) -> &str {
        &self.config.bucket
    }

    /// Create the bucket unless it already exists.
    pub async fn ensure_bucket(&self) -> Result<(), StoreError> {
        let head = self.prepare(Method::HEAD, None, &[], Vec::new(), Vec::new());
        let response = self.send(head).await?;
        match response.status() {
            status if status.is_success() => {
                debug!(bucket = %self.config.bucket, "bucket exists");
                return Ok(());
            }
            StatusCode::NOT_FOUND => {}
            status => return Err(status_error(status, String::new(), &self.config.bucket)),
        }

        let body = if self.config.region == "us-east-1" {
            Vec::new()
        } else {
            format!(
                "<CreateBucketConfiguration xmlns=\"http://s3.amazonaws.com/doc/2006-03-01/\">\
                 <LocationConstraint>{}</LocationConstraint></CreateBucketConfiguration>",
                self.config.region
            )
            .into_bytes()
        };
        let create = self.prepare(Method::PUT, None, &[], Vec::new(), body);
        let response = self.send(create).await?;
        let status = response.status();
        // 409 when a peer created it between the HEAD and the PUT.
        if status.is_success() || status == StatusCode::CONFLICT {
            info!(bucket = %self.config.bucket, "created bucket");
            return Ok(());
        }
        let text = response.text().await.unwrap_or_default();
        Err(status_error(status, text, &self.config.bucket))
    }

    /// Address a key (`Some`) or the bucket itself (`None`).
    fn prepare(
        &self,
        method: Method,
        key: Option<&str>,
        query: &[(&str, &str)],
        headers: Vec<(String, String)>,
        body: Vec<u8>,
    ) -> Prepared {
        let (scheme, authority) = self.config.service_authority();
        let encoded_key = key.map(|k| signer::uri_encode(k, true)).unwrap_or_default();

        let (host, uri) = if self.config.path_style {
            let uri = match key {
                Some(_) => format!("/{}/{}", self.config.bucket, encoded_key),
                None => format!("/{}", self.config.bucket),
            };
            (authority, uri)
        } else {
            (
                format!("{}.{}", self.config.bucket, authority),
                format!("/{}", encoded_key),
            )
        };

        let query = signer::canonical_query(query);
        let url = if query.is_empty() {
            format!("{}://{}{}", scheme, host, uri)
        } else {
            format!("{}://{}{}?{}", scheme, host, uri, query)
        };

        Prepared {
            method,
            url,
            host,
            uri,
            query,
            headers,
            body,
        }
    }

    async fn send(&self, prepared: Prepared) -> Result<reqwest::Response, StoreError> {
        let now = Utc::now();
        let payload_sha256 = if prepared.body.is_empty() {
            EMPTY_PAYLOAD_SHA256.to_string()
        } else {
            signer::sha256_hex(&prepared.body)
        };

        let mut headers = prepared.headers;
        headers.push(("host".to_string(), prepared.host.clone()));
        headers.push(("x-amz-date".to_string(), signer::amz_date(&now)));
        headers.push(("x-amz-content-sha256".to_string(), payload_sha256.clone()));
        if let Some(token) = &self.credentials.session_token {
            headers.push(("x-amz-security-token".to_string(), token.clone()));
        }

        let authorization = signer::authorization(
            &self.credentials,
            &self.config.region,
            &now,
            &CanonicalRequest {
                method: prepared.method.as_str(),
                uri: &prepared.uri,
                query: &prepared.query,
                headers: headers.clone(),
                payload_sha256: &payload_sha256,
            },
        )?;

        trace!(method = %prepared.method, url = %prepared.url, "sending S3 request");
        let mut request = self
            .client
            .request(prepared.method, &prepared.url)
            .header("authorization", authorization);
        // reqwest derives Host from the URL.
        for (name, value) in headers.into_iter().filter(|(name, _)| name != "host") {
            request = request.header(name, value);
        }
        if !prepared.body.is_empty() {
            request = request.body(prepared.body);
        }

        request.send().await.map_err(|e| {
            if e.is_timeout() || e.is_connect() {
                StoreError::Unavailable(e.to_string())
            } else {
                StoreError::Protocol(e.to_string())
            }
        })
    }

    /// Return the response on 2xx, otherwise map the status and error body.
    async fn expect_success(
        response: reqwest::Response,
        key: &str,
    ) -> Result<reqwest::Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let text = response.text().await.unwrap_or_default();
        Err(status_error(status, text, key))
    }
}

fn status_error(status: StatusCode, body: String, key: &str) -> StoreError {
    let (code, message) = xml::parse_error(&body).unwrap_or_else(|| (String::new(), body));
    match status {
        StatusCode::NOT_FOUND if code != "NoSuchBucket" => StoreError::NotFound {
            key: key.to_string(),
        },
        StatusCode::FORBIDDEN | StatusCode::UNAUTHORIZED => {
            StoreError::AccessDenied(format!("{} {}", code, message).trim().to_string())
        }
        StatusCode::SERVICE_UNAVAILABLE => StoreError::Unavailable(message),
        _ => StoreError::Http {
            status: status.as_u16(),
            message: if code.is_empty() {
                message
            } else {
                format!("{}: {}", code, message)
            },
        },
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn list_page(
        &self,
        prefix: &str,
        continuation: Option<&str>,
    ) -> Result<ListPage, StoreError> {
        let mut query = vec![("list-type", "2"), ("prefix", prefix), ("max-keys", MAX_KEYS)];
        if let Some(token) = continuation {
            query.push(("continuation-token", token));
        }

        let prepared = self.prepare(Method::GET, None, &query, Vec::new(), Vec::new());
        let response = Self::expect_success(self.send(prepared).await?, prefix).await?;
        let body = response
            .text()
            .await
            .map_err(|e| StoreError::Protocol(e.to_string()))?;
        xml::parse_list_objects_v2(&body)
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        let prepared = self.prepare(Method::GET, Some(key), &[], Vec::new(), Vec::new());
        let response = Self::expect_success(self.send(prepared).await?, key).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| StoreError::Protocol(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    async fn put(&self, key: &str, body: Vec<u8>, options: &PutOptions) -> Result<(), StoreError> {
        let mut headers = vec![("content-type".to_string(), options.content_type.clone())];
        if options.grant_bucket_owner_full_control {
            headers.push(("x-amz-acl".to_string(), "bucket-owner-full-control".to_string()));
        }
        if let Some(kms_key_id) = &options.kms_key_id {
            headers.push(("x-amz-server-side-encryption".to_string(), "aws:kms".to_string()));
            headers.push((
                "x-amz-server-side-encryption-aws-kms-key-id".to_string(),
                kms_key_id.clone(),
            ));
        }

        let prepared = self.prepare(Method::PUT, Some(key), &[], headers, body);
        Self::expect_success(self.send(prepared).await?, key).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let prepared = self.prepare(Method::DELETE, Some(key), &[], Vec::new(), Vec::new());
        match Self::expect_success(self.send(prepared).await?, key).await {
            Ok(_) | Err(StoreError::NotFound { .. }) => Ok(()),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(config: S3Config) -> S3ObjectStore {
        S3ObjectStore::new(config.credentials(Credentials::new("AKID", "secret"))).unwrap()
    }

    #[test]
    fn test_virtual_hosted_addressing() {
        let s3 = store(S3Config::new("bucket", "eu-west-1"));
        let prepared = s3.prepare(Method::GET, Some("ns/g 1/a.list"), &[], Vec::new(), Vec::new());

        assert_eq!(prepared.host, "bucket.s3.eu-west-1.amazonaws.com");
        assert_eq!(prepared.uri, "/ns/g%201/a.list");
        assert_eq!(
            prepared.url,
            "https://bucket.s3.eu-west-1.amazonaws.com/ns/g%201/a.list"
        );
    }

    #[test]
    fn test_path_style_listing() {
        let s3 = store(
            S3Config::new("bucket", "us-east-1")
                .endpoint("http://localhost:9000")
                .path_style(true),
        );
        let prepared = s3.prepare(
            Method::GET,
            None,
            &[("list-type", "2"), ("prefix", "ns/g1/")],
            Vec::new(),
            Vec::new(),
        );

        assert_eq!(prepared.host, "localhost:9000");
        assert_eq!(prepared.uri, "/bucket");
        assert_eq!(
            prepared.url,
            "http://localhost:9000/bucket?list-type=2&prefix=ns%2Fg1%2F"
        );
    }

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            status_error(StatusCode::NOT_FOUND, String::new(), "k"),
            StoreError::NotFound { .. }
        ));
        let body = "<Error><Code>NoSuchBucket</Code><Message>gone</Message></Error>".to_string();
        assert!(matches!(
            status_error(StatusCode::NOT_FOUND, body, "k"),
            StoreError::Http { status: 404, .. }
        ));
        let body = "<Error><Code>AccessDenied</Code><Message>Access Denied</Message></Error>".to_string();
        assert_eq!(
            status_error(StatusCode::FORBIDDEN, body, "k"),
            StoreError::AccessDenied("AccessDenied Access Denied".to_string())
        );
    }
}
