use super::*;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ClientError {
    #[snafu(display("Failed to connect to {address} after {attempts} attempts"))]
    Connect { address: String, attempts: usize },

    #[snafu(display("Connection timeout: {source}"))]
    Timeout { source: tokio::time::error::Elapsed },

    #[snafu(display("IO error: {source}"))]
    Io { source: std::io::Error },

    #[snafu(display("Channel receive error: {source}"))]
    ChannelRecv {
        source: tokio::sync::oneshot::error::RecvError,
    },

    #[snafu(display("Serialization error: {source}"))]
    Serialization { source: serde_json::Error },

    #[snafu(display("{message}"))]
    Protocol { message: String },

    #[snafu(display("Not connected"))]
    NotConnected,

    #[snafu(display("{response}"))]
    Stratum { response: JsonRpcError },
}

impl ClientError {
    /// Whether the connection behind this error is gone.
    pub fn is_disconnect(&self) -> bool {
        matches!(
            self,
            ClientError::Io { .. } | ClientError::NotConnected | ClientError::ChannelRecv { .. }
        )
    }
}
