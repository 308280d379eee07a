//! The mandatory header set every vendor call must carry.

use crate::checksum::ChecksumProvider;
use crate::checksum::bucket_for_unix_time;

pub fn vendor_headers(
    access_token: &str,
    client_version: &str,
    request_id: &str,
    checksum_provider: &dyn ChecksumProvider,
    now_unix_seconds: u64,
) -> Vec<(&'static str, String)> {
    let bucket = bucket_for_unix_time(now_unix_seconds);
    let checksum = checksum_provider.checksum(access_token, bucket);
    let timezone = std::env::var("TZ").unwrap_or_else(|_| "UTC".to_string());

    vec![
        ("authorization", format!("Bearer {access_token}")),
        ("content-type", "application/grpc-web+proto".to_string()),
        ("x-cursor-checksum", checksum),
        ("x-cursor-client-version", client_version.to_string()),
        ("x-cursor-client-type", "cli".to_string()),
        ("x-cursor-timezone", timezone),
        ("x-ghost-mode", "true".to_string()),
        ("x-request-id", request_id.to_string()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checksum::StubChecksumProvider;

    #[test]
    fn builds_the_full_mandatory_header_set() {
        let headers = vendor_headers(
            "tok",
            "0.1.0",
            "req-1",
            &StubChecksumProvider,
            1_700_000_000,
        );
        let names: Vec<&str> = headers.iter().map(|(k, _)| *k).collect();
        for required in [
            "authorization",
            "content-type",
            "x-cursor-checksum",
            "x-cursor-client-version",
            "x-cursor-client-type",
            "x-cursor-timezone",
            "x-ghost-mode",
            "x-request-id",
        ] {
            assert!(names.contains(&required), "missing header {required}");
        }
    }
}
