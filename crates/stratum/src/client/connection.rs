use super::*;

pub(super) enum ClientMessage {
    Request {
        method: &'static str,
        params: Value,
        respond_to: oneshot::Sender<Result<Message>>,
    },
    Disconnect,
}

/// Owns one TCP connection: the line-framed reader, the writer and the
/// table of requests awaiting a response.
pub(super) struct Connection {
    address: String,
    rx: mpsc::Receiver<ClientMessage>,
    events: mpsc::Sender<Event>,
    id_counter: u64,
    pending: BTreeMap<Id, oneshot::Sender<Result<Message>>>,
}

impl Connection {
    pub(super) fn new(
        address: String,
        rx: mpsc::Receiver<ClientMessage>,
        events: mpsc::Sender<Event>,
    ) -> Self {
        Self {
            address,
            rx,
            events,
            id_counter: 0,
            pending: BTreeMap::new(),
        }
    }

    pub(super) async fn run(mut self, stream: TcpStream) {
        let (reader, writer) = stream.into_split();
        let mut reader = FramedRead::new(reader, LineCodec::new(MAX_MESSAGE_SIZE));
        let mut writer = BufWriter::new(writer);

        loop {
            tokio::select! {
                msg = self.rx.recv() => match msg {
                    Some(ClientMessage::Request { method, params, respond_to }) => {
                        let id = self.next_id();

                        let message = Message::Request {
                            id: id.clone(),
                            method: method.into(),
                            params,
                        };

                        if let Err(err) = Self::write(&mut writer, &message).await {
                            let fatal = err.is_disconnect();
                            if respond_to.send(Err(err)).is_err() {
                                debug!("Request error dropped: caller gave up");
                            }
                            if fatal {
                                break;
                            }
                            continue;
                        }

                        debug!(%id, method, "Sent request");
                        self.track(id, respond_to);
                    }
                    Some(ClientMessage::Disconnect) | None => {
                        debug!("Closing connection to {}", self.address);
                        break;
                    }
                },
                frame = reader.next() => match frame {
                    Some(Ok(Frame::Line(line))) => {
                        if !self.handle_line(&line).await {
                            break;
                        }
                    }
                    Some(Ok(Frame::Oversized)) => {
                        warn!(
                            "Dropping line over {MAX_MESSAGE_SIZE} bytes from {}",
                            self.address
                        );
                    }
                    Some(Err(err)) => {
                        error!("Read error from {}: {err}", self.address);
                        break;
                    }
                    None => {
                        warn!("Pool {} closed the connection", self.address);
                        break;
                    }
                },
            }
        }

        for (_, tx) in std::mem::take(&mut self.pending) {
            if tx.send(Err(ClientError::NotConnected)).is_err() {
                debug!("NotConnected response dropped: caller gave up");
            }
        }

        if self.events.send(Event::Disconnected).await.is_err() {
            debug!("Disconnected event dropped: no subscribers");
        }
    }

    /// Requests whose caller timed out have a closed sender; forget them so
    /// a pool that never answers cannot grow the table.
    fn track(&mut self, id: Id, respond_to: oneshot::Sender<Result<Message>>) {
        self.pending.retain(|_, tx| !tx.is_closed());
        self.pending.insert(id, respond_to);
    }

    fn next_id(&mut self) -> Id {
        self.id_counter += 1;
        Id::Number(self.id_counter)
    }

    async fn write(writer: &mut BufWriter<OwnedWriteHalf>, message: &Message) -> Result {
        let frame = serde_json::to_string(message).context(error::SerializationSnafu)? + "\n";

        writer
            .write_all(frame.as_bytes())
            .await
            .context(error::IoSnafu)?;

        writer.flush().await.context(error::IoSnafu)
    }

    /// Returns false once nobody is listening for events anymore.
    async fn handle_line(&mut self, line: &[u8]) -> bool {
        if line.trim_ascii().is_empty() {
            return true;
        }

        let message = match serde_json::from_slice::<Message>(line) {
            Ok(message) => message,
            Err(err) => {
                warn!(
                    "Dropping malformed line {:?}: {err}",
                    String::from_utf8_lossy(line)
                );
                return true;
            }
        };

        match message {
            Message::Response {
                id,
                result,
                error,
                reject_reason,
            } => match self.pending.remove(&id) {
                Some(tx) => {
                    let response = Message::Response {
                        id,
                        result,
                        error,
                        reject_reason,
                    };

                    if tx.send(Ok(response)).is_err() {
                        debug!("Response dropped: caller gave up");
                    }
                }
                None => warn!("Unmatched response with id {id}"),
            },
            Message::Notification { method, params } => {
                if let Some(event) = Self::parse_notification(&method, params) {
                    return self.events.send(event).await.is_ok();
                }
            }
            Message::Request { id, method, .. } => {
                debug!(%id, "Ignoring server request {method}");
            }
        }

        true
    }

    fn parse_notification(method: &str, params: Value) -> Option<Event> {
        match method {
            "mining.notify" => match serde_json::from_value::<Notify>(params) {
                Ok(notify) => Some(Event::Notify(notify)),
                Err(err) => {
                    warn!("Skipping malformed mining.notify: {err}");
                    None
                }
            },
            "mining.set_difficulty" => match serde_json::from_value::<SetDifficulty>(params) {
                Ok(set_difficulty) => match set_difficulty.difficulty() {
                    Some(difficulty) => Some(Event::SetDifficulty(difficulty)),
                    None => {
                        warn!("Skipping mining.set_difficulty without a difficulty");
                        None
                    }
                },
                Err(err) => {
                    warn!("Skipping malformed mining.set_difficulty: {err}");
                    None
                }
            },
            _ => {
                debug!("Ignoring notification {method}");
                None
            }
        }
    }
}
