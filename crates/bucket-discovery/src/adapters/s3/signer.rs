//! AWS Signature Version 4 request signing.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use super::config::Credentials;
use crate::domain::StoreError;

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "AWS4-HMAC-SHA256";
const SERVICE: &str = "s3";

/// Hex SHA-256 of an empty body.
pub(crate) const EMPTY_PAYLOAD_SHA256: &str =
    "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

/// Canonical pieces of a request, already URI-encoded.
#[derive(Debug)]
pub(crate) struct CanonicalRequest<'a> {
    pub method: &'a str,
    pub uri: &'a str,
    pub query: &'a str,
    /// Lowercase header names with trimmed values. Must include `host`,
    /// `x-amz-date` and `x-amz-content-sha256`.
    pub headers: Vec<(String, String)>,
    pub payload_sha256: &'a str,
}

impl CanonicalRequest<'_> {
    fn signed_headers(&self, sorted: &[(String, String)]) -> String {
        sorted
            .iter()
            .map(|(name, _)| name.as_str())
            .collect::<Vec<_>>()
            .join(";")
    }

    fn render(&self) -> (String, String) {
        let mut sorted = self.headers.clone();
        sorted.sort_by(|a, b| a.0.cmp(&b.0));

        let canonical_headers: String = sorted
            .iter()
            .map(|(name, value)| format!("{}:{}\n", name, value.trim()))
            .collect();
        let signed_headers = self.signed_headers(&sorted);

        let rendered = format!(
            "{}\n{}\n{}\n{}\n{}\n{}",
            self.method, self.uri, self.query, canonical_headers, signed_headers, self.payload_sha256
        );
        (rendered, signed_headers)
    }
}

pub(crate) fn amz_date(at: &DateTime<Utc>) -> String {
    at.format("%Y%m%dT%H%M%SZ").to_string()
}

pub(crate) fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

fn hmac(key: &[u8], data: &[u8]) -> Result<Vec<u8>, StoreError> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| StoreError::Protocol(format!("hmac key: {}", e)))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Produce the `Authorization` header value for `request`.
pub(crate) fn authorization(
    credentials: &Credentials,
    region: &str,
    at: &DateTime<Utc>,
    request: &CanonicalRequest<'_>,
) -> Result<String, StoreError> {
    let date = at.format("%Y%m%d").to_string();
    let scope = format!("{}/{}/{}/aws4_request", date, region, SERVICE);

    let (canonical, signed_headers) = request.render();
    let string_to_sign = format!(
        "{}\n{}\n{}\n{}",
        ALGORITHM,
        amz_date(at),
        scope,
        sha256_hex(canonical.as_bytes())
    );

    let k_date = hmac(
        format!("AWS4{}", credentials.secret_access_key).as_bytes(),
        date.as_bytes(),
    )?;
    let k_region = hmac(&k_date, region.as_bytes())?;
    let k_service = hmac(&k_region, SERVICE.as_bytes())?;
    let k_signing = hmac(&k_service, b"aws4_request")?;
    let signature = hex::encode(hmac(&k_signing, string_to_sign.as_bytes())?);

    Ok(format!(
        "{} Credential={}/{}, SignedHeaders={}, Signature={}",
        ALGORITHM, credentials.access_key_id, scope, signed_headers, signature
    ))
}

/// RFC 3986 encoding as SigV4 wants it. `/` is kept only for paths.
pub(crate) fn uri_encode(value: &str, keep_slash: bool) -> String {
    let mut encoded = String::with_capacity(value.len());
    for byte in value.as_bytes() {
        match *byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                encoded.push(char::from(*byte))
            }
            b'/' if keep_slash => encoded.push('/'),
            other => encoded.push_str(&format!("%{:02X}", other)),
        }
    }
    encoded
}

/// Sorted, encoded `k=v&k=v` query string.
pub(crate) fn canonical_query(params: &[(&str, &str)]) -> String {
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (uri_encode(k, false), uri_encode(v, false)))
        .collect();
    encoded.sort();
    encoded
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&")
}
