//! Minimal readers for the S3 XML responses the adapter consumes.
//!
//! Only `ListBucketResult` (ListObjectsV2) and `Error` bodies are needed, both
//! flat enough that tag scanning is sufficient.

use crate::domain::StoreError;
use crate::ports::{ListPage, ObjectSummary};

/// Parse a ListObjectsV2 response body.
pub(crate) fn parse_list_objects_v2(body: &str) -> Result<ListPage, StoreError> {
    if !body.contains("<ListBucketResult") {
        return Err(StoreError::Protocol(
            "response is not a ListBucketResult".to_string(),
        ));
    }

    let mut objects = Vec::new();
    for block in blocks(body, "Contents") {
        let key = tag_text(block, "Key")
            .ok_or_else(|| StoreError::Protocol("Contents without Key".to_string()))?;
        let size = match tag_text(block, "Size") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|_| StoreError::Protocol(format!("invalid Size '{}'", raw)))?,
            None => 0,
        };
        objects.push(ObjectSummary::new(key, size));
    }

    let truncated = tag_text(body, "IsTruncated")
        .map(|v| v.trim().eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    let next_continuation = if truncated {
        tag_text(body, "NextContinuationToken").filter(|t| !t.is_empty())
    } else {
        None
    };

    Ok(ListPage {
        objects,
        next_continuation,
    })
}

/// `(Code, Message)` of an S3 `Error` body, when there is one.
pub(crate) fn parse_error(body: &str) -> Option<(String, String)> {
    let error = blocks(body, "Error").next()?;
    let code = tag_text(error, "Code").unwrap_or_default();
    let message = tag_text(error, "Message").unwrap_or_default();
    Some((code, message))
}

/// Inner text of every `<tag>...</tag>` in `body`, in order.
fn blocks<'a>(body: &'a str, tag: &str) -> impl Iterator<Item = &'a str> + 'a {
    let open = format!("<{}>", tag);
    let close = format!("</{}>", tag);
    let mut rest = body;
    std::iter::from_fn(move || {
        let start = rest.find(&open)? + open.len();
        let len = rest[start..].find(&close)?;
        let inner = &rest[start..start + len];
        rest = &rest[start + len + close.len()..];
        Some(inner)
    })
}

/// Unescaped text of the first `<tag>` in `body`.
fn tag_text(body: &str, tag: &str) -> Option<String> {
    blocks(body, tag).next().map(xml_unescape)
}

fn xml_unescape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp..];
        let Some(semi) = after.find(';') else {
            out.push_str(after);
            return out;
        };
        let entity = &after[1..semi];
        let decoded = match entity {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            _ => entity
                .strip_prefix("#x")
                .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                .or_else(|| entity.strip_prefix('#').and_then(|dec| dec.parse().ok()))
                .and_then(char::from_u32),
        };
        match decoded {
            Some(ch) => {
                out.push(ch);
                rest = &after[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &after[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
