use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

/// Binary result (e.g. a captured screenshot) encoded for a text protocol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagePayload {
	pub mime_type: String,
	/// Base64 (standard alphabet, padded) encoded bytes.
	pub data: String,
}

impl ImagePayload {
	pub fn png(bytes: &[u8]) -> Self {
		Self::new("image/png", bytes)
	}

	pub fn new(mime_type: impl Into<String>, bytes: &[u8]) -> Self {
		Self {
			mime_type: mime_type.into(),
			data: STANDARD.encode(bytes),
		}
	}

	pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
		STANDARD.decode(&self.data)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn png_payload_declares_mime_type() {
		let payload = ImagePayload::png(&[0x89, b'P', b'N', b'G']);
		assert_eq!(payload.mime_type, "image/png");
		assert_eq!(payload.data, "iVBORw==");
		assert_eq!(payload.decode().unwrap(), vec![0x89, b'P', b'N', b'G']);
	}
}
