//! Error types for pktlab

use thiserror::Error;

/// Result type alias for pktlab operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for pktlab
#[derive(Error, Debug)]
pub enum Error {
    /// File or stream I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Packet-memory environment could not be set up
    #[error("Environment setup error: {0}")]
    Environment(String),

    /// Every buffer of the pool is currently handed out
    #[error("Mempool '{pool}' exhausted ({capacity} buffers in use)")]
    PoolExhausted { pool: String, capacity: usize },

    /// Packet construction error
    #[error("Packet construction error: {0}")]
    PacketConstruction(String),

    /// A header region required by the operation is absent from the packet
    #[error("Packet has no {0} header")]
    MissingHeader(&'static str),

    /// Capture file error
    #[error("Capture error: {0}")]
    Capture(String),

    /// Invalid parameter error
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },
}

impl Error {
    /// Create an environment error with a custom message
    pub fn environment<S: Into<String>>(msg: S) -> Self {
        Error::Environment(msg.into())
    }

    /// Create a packet construction error with a custom message
    pub fn construction<S: Into<String>>(msg: S) -> Self {
        Error::PacketConstruction(msg.into())
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter<S: Into<String>>(name: S, reason: S) -> Self {
        Error::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::PoolExhausted {
            pool: "Test".into(),
            capacity: 8191,
        };
        assert_eq!(err.to_string(), "Mempool 'Test' exhausted (8191 buffers in use)");

        let err = Error::MissingHeader("UDP");
        assert_eq!(err.to_string(), "Packet has no UDP header");

        let err = Error::invalid_parameter("burst_size", "must be non-zero");
        assert_eq!(
            err.to_string(),
            "Invalid parameter 'burst_size': must be non-zero"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
