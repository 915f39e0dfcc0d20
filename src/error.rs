//! Unified error type.

use crate::config::ConfigError;

/// Failures that stop the service from starting or serving.
///
/// Request-level problems (404, 422 and so on) are answered as
/// [`Response`](crate::Response) values and never surface here. This type
/// covers loading configuration, binding the port and accepting connections.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("config: {0}")]
    Config(#[from] ConfigError),
}
