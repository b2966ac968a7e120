//! Line-oriented text format.
//!
//! ```text
//! <logical-name> <address> <physical-address> <T|F>
//! ```
//!
//! One record per line. Inside a field, `%`, whitespace and control
//! characters are percent-escaped; an empty field is written as `-` (a
//! literal `-` becomes `%2D`).

use crate::domain::{CodecError, NodeAddress, PeerRecord};
use crate::ports::RecordCodec;

const EMPTY_FIELD: &str = "-";

/// Default codec, `text/plain`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextRecordCodec;

impl RecordCodec for TextRecordCodec {
    fn encode(&self, records: &[PeerRecord]) -> Result<Vec<u8>, CodecError> {
        let mut out = String::new();
        for record in records {
            out.push_str(&escape_field(&record.logical_name));
            out.push(' ');
            out.push_str(&record.address.to_string());
            out.push(' ');
            out.push_str(&escape_field(&record.physical_addr));
            out.push(' ');
            out.push(if record.is_coordinator { 'T' } else { 'F' });
            out.push('\n');
        }
        Ok(out.into_bytes())
    }

    fn decode(&self, payload: &[u8]) -> Result<Vec<PeerRecord>, CodecError> {
        let text = std::str::from_utf8(payload).map_err(|_| CodecError::InvalidUtf8)?;

        let mut records = Vec::new();
        for (idx, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            records.push(parse_line(idx + 1, line)?);
        }
        Ok(records)
    }

    fn content_type(&self) -> &'static str {
        "text/plain"
    }
}

fn parse_line(line_no: usize, line: &str) -> Result<PeerRecord, CodecError> {
    let malformed = |reason: String| CodecError::Malformed {
        line: line_no,
        reason,
    };

    let fields: Vec<&str> = line.split_ascii_whitespace().collect();
    let [logical, address, physical, coord] = fields.as_slice() else {
        return Err(malformed(format!("expected 4 fields, found {}", fields.len())));
    };

    let address: NodeAddress = address
        .parse()
        .map_err(|_| malformed(format!("invalid address '{}'", address)))?;
    let is_coordinator = match *coord {
        "T" => true,
        "F" => false,
        other => return Err(malformed(format!("invalid coordinator flag '{}'", other))),
    };
    let logical = unescape_field(logical).ok_or_else(|| malformed("bad escape in name".into()))?;
    let physical =
        unescape_field(physical).ok_or_else(|| malformed("bad escape in physical address".into()))?;

    Ok(PeerRecord::new(address, logical, physical).with_coordinator(is_coordinator))
}

fn escape_field(value: &str) -> String {
    if value.is_empty() {
        return EMPTY_FIELD.to_string();
    }
    if value == EMPTY_FIELD {
        return "%2D".to_string();
    }
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if ch == '%' || ch.is_whitespace() || ch.is_control() {
            let mut buf = [0u8; 4];
            for byte in ch.encode_utf8(&mut buf).as_bytes() {
                escaped.push_str(&format!("%{:02X}", byte));
            }
        } else {
            escaped.push(ch);
        }
    }
    escaped
}

fn unescape_field(field: &str) -> Option<String> {
    if field == EMPTY_FIELD {
        return Some(String::new());
    }
    let bytes = field.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = field.get(i + 1..i + 3)?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_layout() {
        let addr = NodeAddress::random();
        let record = PeerRecord::new(addr, "node-a", "10.0.0.1:7800").with_coordinator(true);

        let bytes = TextRecordCodec.encode(&[record]).unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            format!("node-a {} 10.0.0.1:7800 T\n", addr)
        );
    }

    #[test]
    fn test_awkward_fields_survive() {
        let records = vec![
            PeerRecord::new(NodeAddress::random(), "my node 100%", "[::1]:7800"),
            PeerRecord::new(NodeAddress::random(), "", "-"),
            PeerRecord::new(NodeAddress::random(), "tab\there\nnl", "host:1").with_coordinator(true),
        ];

        let bytes = TextRecordCodec.encode(&records).unwrap();
        assert_eq!(String::from_utf8_lossy(&bytes).lines().count(), 3);
        assert_eq!(TextRecordCodec.decode(&bytes).unwrap(), records);
    }

    #[test]
    fn test_blank_payload_decodes_to_nothing() {
        assert!(TextRecordCodec.decode(b"").unwrap().is_empty());
        assert!(TextRecordCodec.decode(b"\n  \n").unwrap().is_empty());
    }

    #[test]
    fn test_malformed_lines_are_rejected() {
        let addr = NodeAddress::random();

        let err = TextRecordCodec.decode(b"only two").unwrap_err();
        assert!(matches!(err, CodecError::Malformed { line: 1, .. }));

        let bad_flag = format!("\na {} h:1 X\n", addr);
        let err = TextRecordCodec.decode(bad_flag.as_bytes()).unwrap_err();
        assert!(matches!(err, CodecError::Malformed { line: 2, .. }));

        let err = TextRecordCodec.decode(b"a not-a-uuid h:1 F").unwrap_err();
        assert!(matches!(err, CodecError::Malformed { .. }));

        assert_eq!(
            TextRecordCodec.decode(&[0xff, 0xfe]).unwrap_err(),
            CodecError::InvalidUtf8
        );
    }
}
