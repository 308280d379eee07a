//! The two vendor HTTP calls a session drives: the server-streaming
//! `RunSSE` open and the unary `BidiAppend` used both to seed the turn and
//! to post every subsequent client message.

use std::sync::Arc;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use bridge_common::ChecksumProvider;
use bridge_protocol::BidiAppendRequest;
use bridge_protocol::BidiRequestId;
use bridge_protocol::hex_blob_id;
use bridge_wire::encode_frame;
use reqwest::header::HeaderMap;
use reqwest::header::HeaderName;
use reqwest::header::HeaderValue;

use crate::error::Result;
use crate::error::SessionError;

#[derive(Clone)]
pub struct VendorClient {
    http: reqwest::Client,
    base_url: String,
    access_token: String,
    client_version: String,
    checksum_provider: Arc<dyn ChecksumProvider>,
}

impl VendorClient {
    pub fn new(
        base_url: String,
        access_token: String,
        client_version: String,
        checksum_provider: Arc<dyn ChecksumProvider>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            access_token,
            client_version,
            checksum_provider,
        }
    }

    fn headers(&self, request_id: &str) -> HeaderMap {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        let pairs = bridge_common::vendor_headers(
            &self.access_token,
            &self.client_version,
            request_id,
            self.checksum_provider.as_ref(),
            now,
        );
        let mut headers = HeaderMap::new();
        for (name, value) in pairs {
            if let (Ok(name), Ok(value)) = (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(&value),
            ) {
                headers.insert(name, value);
            }
        }
        headers
    }

    /// Opens the server-streaming call and returns the raw response whose
    /// body the session will read as a frame stream.
    pub async fn open_run_sse(&self, request_id: &str) -> Result<reqwest::Response> {
        let envelope = encode_frame(0, &BidiRequestId { request_id: request_id.to_string() }.encode());
        let response = self
            .http
            .post(format!("{}/agent.v1.AgentService/RunSSE", self.base_url))
            .headers(self.headers(request_id))
            .body(envelope)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SessionError::Transport { status, body });
        }
        Ok(response)
    }

    /// Posts one `BidiAppendRequest` carrying `message_bytes` (an encoded
    /// `AgentClientMessage`) at the given sequence number.
    pub async fn bidi_append(
        &self,
        request_id: &str,
        append_seqno: u64,
        message_bytes: &[u8],
    ) -> Result<()> {
        let append = BidiAppendRequest {
            data_hex: hex_blob_id(message_bytes),
            request_id: BidiRequestId {
                request_id: request_id.to_string(),
            },
            append_seqno,
        };
        let envelope = encode_frame(0, &append.encode());

        let response = self
            .http
            .post(format!("{}/aiserver.v1.BidiService/BidiAppend", self.base_url))
            .headers(self.headers(request_id))
            .body(envelope)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SessionError::Transport { status, body });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use bridge_common::StubChecksumProvider;

    #[test]
    fn headers_include_bearer_token_and_checksum() {
        let client = VendorClient::new(
            "https://api2.cursor.sh".to_string(),
            "tok-123".to_string(),
            "0.1.0".to_string(),
            Arc::new(StubChecksumProvider),
        );
        let headers = client.headers("req-1");
        assert_eq!(
            headers.get("authorization").unwrap(),
            "Bearer tok-123"
        );
        assert!(headers.contains_key("x-cursor-checksum"));
        assert!(headers.contains_key("x-request-id"));
    }
}
