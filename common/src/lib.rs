//! Ambient, cross-cutting concerns shared by `bridge-core` and the gateway
//! binary: configuration, the checksum seam, and vendor header assembly.

pub mod checksum;
pub mod config;
pub mod headers;

pub use checksum::ChecksumProvider;
pub use checksum::StubChecksumProvider;
pub use checksum::bucket_for_unix_time;
pub use config::GatewayConfig;
pub use headers::vendor_headers;
