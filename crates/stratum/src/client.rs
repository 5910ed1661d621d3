use {
    super::*,
    connection::{ClientMessage, Connection},
    framing::{Frame, LineCodec},
    futures::StreamExt,
    std::{collections::BTreeMap, time::Duration},
    tokio::{
        io::{AsyncWriteExt, BufWriter},
        net::{TcpStream, tcp::OwnedWriteHalf},
        sync::{mpsc, oneshot},
    },
    tokio_util::codec::FramedRead,
    tracing::{debug, error, info, warn},
};

pub use error::ClientError;

mod connection;
mod error;
mod framing;

pub type Result<T = (), E = ClientError> = std::result::Result<T, E>;

pub type EventReceiver = mpsc::Receiver<Event>;

const CHANNEL_BUFFER_SIZE: usize = 256;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub address: String,
    pub username: String,
    pub password: Option<String>,
    pub timeout: Duration,
}

/// Handle to one pool connection. Cheap to clone; every clone talks to the
/// same connection task, so requests from different tasks may be in flight
/// at once and are matched to their responses by id.
#[derive(Debug, Clone)]
pub struct Client {
    config: ClientConfig,
    tx: mpsc::Sender<ClientMessage>,
}

impl Client {
    pub async fn connect(config: ClientConfig) -> Result<(Self, EventReceiver)> {
        let stream = tokio::time::timeout(config.timeout, TcpStream::connect(&config.address))
            .await
            .context(error::TimeoutSnafu)?
            .context(error::IoSnafu)?;

        stream.set_nodelay(true).context(error::IoSnafu)?;

        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        let (events_tx, events_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        tokio::spawn(Connection::new(config.address.clone(), rx, events_tx).run(stream));

        info!("Connected to {}", config.address);

        Ok((Self { config, tx }, events_rx))
    }

    pub fn address(&self) -> &str {
        &self.config.address
    }

    pub fn username(&self) -> &str {
        &self.config.username
    }

    pub async fn disconnect(&self) {
        if self.tx.send(ClientMessage::Disconnect).await.is_err() {
            debug!("Connection already closed");
        }
    }

    pub async fn subscribe(&self, user_agent: &str) -> Result<SubscribeResult> {
        let params = serde_json::to_value(Subscribe {
            user_agent: user_agent.into(),
            extranonce1: None,
        })
        .context(error::SerializationSnafu)?;

        match self.request("mining.subscribe", params).await? {
            Message::Response {
                result: Some(result),
                error: None,
                ..
            } => serde_json::from_value(result).map_err(|err| ClientError::Protocol {
                message: format!("malformed mining.subscribe result: {err}"),
            }),
            Message::Response {
                error: Some(response),
                ..
            } => Err(ClientError::Stratum { response }),
            _ => Err(ClientError::Protocol {
                message: "mining.subscribe response without result".into(),
            }),
        }
    }

    /// Returns the pool's verdict; an explicit `false` is not an error.
    pub async fn authorize(&self) -> Result<bool> {
        let params = serde_json::to_value(Authorize {
            username: self.config.username.clone(),
            password: self.config.password.clone(),
        })
        .context(error::SerializationSnafu)?;

        match self.request("mining.authorize", params).await? {
            Message::Response {
                error: Some(response),
                ..
            } => Err(ClientError::Stratum { response }),
            Message::Response { result, .. } => Ok(result == Some(Value::Bool(true))),
            _ => Err(ClientError::Protocol {
                message: "unexpected mining.authorize response".into(),
            }),
        }
    }

    pub async fn submit(&self, submit: &Submit) -> Result<SubmitResponse> {
        let params = serde_json::to_value(submit).context(error::SerializationSnafu)?;

        let response = self.request("mining.submit", params).await?;

        Ok(SubmitResponse::from_message(&response))
    }

    async fn request(&self, method: &'static str, params: Value) -> Result<Message> {
        let (respond_to, rx) = oneshot::channel();

        self.tx
            .send(ClientMessage::Request {
                method,
                params,
                respond_to,
            })
            .await
            .map_err(|_| ClientError::NotConnected)?;

        tokio::time::timeout(self.config.timeout, rx)
            .await
            .context(error::TimeoutSnafu)?
            .context(error::ChannelRecvSnafu)?
    }
}

/// Dial with a fixed number of attempts and a fixed delay between them.
pub async fn connect_with_retry(
    config: &ClientConfig,
    attempts: usize,
    delay: Duration,
) -> Result<(Client, EventReceiver)> {
    let attempts = attempts.max(1);

    for attempt in 1..=attempts {
        match Client::connect(config.clone()).await {
            Ok(connected) => return Ok(connected),
            Err(err) => {
                warn!(
                    "Connection attempt {attempt}/{attempts} to {} failed: {err}",
                    config.address
                );

                if attempt < attempts {
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    Err(ClientError::Connect {
        address: config.address.clone(),
        attempts,
    })
}
