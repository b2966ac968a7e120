//! Versioned JSON format: `{"version":1,"records":[...]}`.

use serde::{Deserialize, Serialize};

use crate::domain::{CodecError, PeerRecord};
use crate::ports::RecordCodec;

/// Format version written by this build.
pub const JSON_FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    version: u32,
    records: &'a [PeerRecord],
}

#[derive(Deserialize)]
struct VersionProbe {
    version: u32,
}

#[derive(Deserialize)]
struct Envelope {
    records: Vec<PeerRecord>,
}

/// `application/json` codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRecordCodec;

impl RecordCodec for JsonRecordCodec {
    fn encode(&self, records: &[PeerRecord]) -> Result<Vec<u8>, CodecError> {
        serde_json::to_vec(&EnvelopeRef {
            version: JSON_FORMAT_VERSION,
            records,
        })
        .map_err(|e| CodecError::Json(e.to_string()))
    }

    fn decode(&self, payload: &[u8]) -> Result<Vec<PeerRecord>, CodecError> {
        let probe: VersionProbe =
            serde_json::from_slice(payload).map_err(|e| CodecError::Json(e.to_string()))?;
        if probe.version != JSON_FORMAT_VERSION {
            return Err(CodecError::UnsupportedVersion(probe.version));
        }
        let envelope: Envelope =
            serde_json::from_slice(payload).map_err(|e| CodecError::Json(e.to_string()))?;
        Ok(envelope.records)
    }

    fn content_type(&self) -> &'static str {
        "application/json"
    }
}
