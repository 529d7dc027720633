//! Client side of the off-chain DA server.
//!
//! The DA server accepts opaque blobs over HTTP and answers with a locator
//! string `<namespace>/<height>/<index>` naming where the blob was included.

mod errors;
mod http;
mod traits;

pub use errors::DaTransportError;
pub use http::HttpDaTransport;
#[cfg(any(test, feature = "test-utils"))]
pub use traits::MockDaTransport;
pub use traits::DaTransport;
