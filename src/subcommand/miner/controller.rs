use {
    super::*,
    futures::future::{BoxFuture, FutureExt},
    searcher::{FoundShare, NonceRange, NonceSearcher, Worker},
};

const REPORT_INTERVAL: Duration = Duration::from_secs(10);
const SHARE_BUFFER_SIZE: usize = 32;

type Submission = BoxFuture<'static, (FoundShare, Result<SubmitResponse, ClientError>)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub(crate) enum State {
    Disconnected,
    Subscribing,
    Authorizing,
    Ready,
    Mining,
    Submitting,
}

#[derive(Debug)]
pub(crate) enum Outcome {
    /// The connection was lost; the caller should redial.
    Disconnected,
    Cancelled,
    /// `--once`: the first share that got a verdict.
    Done(Share),
}

pub(crate) struct SessionOptions {
    pub(crate) username: String,
    pub(crate) cpu_cores: usize,
    pub(crate) share_factor: f64,
    pub(crate) min_diff: Option<f64>,
    pub(crate) once: bool,
}

/// Drives one pool connection: handshake, then jobs in and shares out until
/// the connection drops or the token is cancelled.
pub(crate) struct Controller {
    client: Client,
    events: EventReceiver,
    options: SessionOptions,
    cancel: CancellationToken,
    hasher: Arc<dyn DoubleHash>,
    metrics: Arc<Metrics>,
    state: State,
    extranonce1: Extranonce,
    extranonce2_size: usize,
    pool_difficulty: Option<Difficulty>,
    generation: u64,
    clean_generation: u64,
    mining_cancel: Option<CancellationToken>,
    share_tx: mpsc::Sender<FoundShare>,
    share_rx: mpsc::Receiver<FoundShare>,
}

impl Controller {
    pub(crate) fn new(
        client: Client,
        events: EventReceiver,
        options: SessionOptions,
        hasher: Arc<dyn DoubleHash>,
        cancel: CancellationToken,
    ) -> Self {
        let (share_tx, share_rx) = mpsc::channel(SHARE_BUFFER_SIZE);

        Self {
            client,
            events,
            options,
            cancel,
            hasher,
            metrics: Arc::new(Metrics::new()),
            state: State::Disconnected,
            extranonce1: Extranonce::default(),
            extranonce2_size: 0,
            pool_difficulty: None,
            generation: 0,
            clean_generation: 0,
            mining_cancel: None,
            share_tx,
            share_rx,
        }
    }

    pub(crate) async fn run(mut self) -> Result<Outcome> {
        let cancel = self.cancel.clone();

        let outcome = tokio::select! {
            outcome = self.session() => outcome,
            _ = cancel.cancelled() => Ok(Outcome::Cancelled),
        };

        self.stop_workers();
        self.client.disconnect().await;
        self.set_state(State::Disconnected);

        info!("Session ended: {}", self.metrics.status_line());

        outcome
    }

    async fn session(&mut self) -> Result<Outcome> {
        if !self.handshake().await {
            return Ok(Outcome::Disconnected);
        }

        let mut submissions = FuturesUnordered::<Submission>::new();

        let mut report = tokio::time::interval_at(
            tokio::time::Instant::now() + REPORT_INTERVAL,
            REPORT_INTERVAL,
        );

        loop {
            tokio::select! {
                event = self.events.recv() => match event {
                    Some(Event::Notify(notify)) => self.handle_notify(notify),
                    Some(Event::SetDifficulty(difficulty)) => self.handle_set_difficulty(difficulty),
                    Some(Event::Disconnected) | None => {
                        warn!("Lost connection to {}", self.client.address());
                        return Ok(Outcome::Disconnected);
                    }
                },
                Some(found) = self.share_rx.recv() => {
                    if let Some(submission) = self.submission(found) {
                        submissions.push(submission);
                        self.set_state(State::Submitting);
                    }
                }
                Some((found, response)) = submissions.next(), if !submissions.is_empty() => {
                    if submissions.is_empty() && self.mining_cancel.is_some() {
                        self.set_state(State::Mining);
                    }

                    if let Some(share) = self.handle_submit_response(found, response)
                        && self.options.once
                    {
                        return Ok(Outcome::Done(share));
                    }
                }
                _ = report.tick() => {
                    info!("{}", self.metrics.status_line());
                }
            }
        }
    }

    /// Shares found before the latest clean job are dropped.
    fn submission(&self, found: FoundShare) -> Option<Submission> {
        if found.generation < self.clean_generation {
            info!(
                "Dropping share for job {} superseded by a clean job",
                found.job.job_id()
            );
            return None;
        }

        let submit = Submit {
            username: self.options.username.clone(),
            job_id: found.job.job_id().clone(),
            extranonce2: found.extranonce2.clone(),
            ntime: found.job.ntime(),
            nonce: found.nonce,
        };

        info!(
            "Found share for job {}: nonce={} extranonce2={} difficulty={:.4}",
            submit.job_id,
            submit.nonce,
            submit.extranonce2,
            hash_difficulty(&found.hash)
        );

        let client = self.client.clone();

        Some(
            async move {
                let response = client.submit(&submit).await;
                (found, response)
            }
            .boxed(),
        )
    }

    /// Subscribe and authorize. Returns false when the session should be
    /// torn down and redialed.
    async fn handshake(&mut self) -> bool {
        self.set_state(State::Subscribing);

        let subscribed = match self.client.subscribe(USER_AGENT).await {
            Ok(subscribed) => subscribed,
            Err(err) => {
                warn!("mining.subscribe to {} failed: {err}", self.client.address());
                return false;
            }
        };

        info!(
            "Subscribed: extranonce1={} extranonce2_size={}",
            subscribed.extranonce1, subscribed.extranonce2_size
        );

        self.extranonce1 = subscribed.extranonce1;
        self.extranonce2_size = subscribed.extranonce2_size;

        self.set_state(State::Authorizing);

        match self.client.authorize().await {
            Ok(true) => info!("Authorized as {}", self.client.username()),
            Ok(false) => error!(
                "Pool refused authorization for {}, mining anyway",
                self.client.username()
            ),
            Err(err) if err.is_disconnect() => {
                warn!("mining.authorize failed: {err}");
                return false;
            }
            Err(err) => error!("mining.authorize failed: {err}, mining anyway"),
        }

        self.set_state(State::Ready);

        true
    }

    fn handle_notify(&mut self, notify: Notify) {
        let job = Arc::new(Job::new(
            notify,
            self.extranonce1.clone(),
            self.extranonce2_size,
        ));

        self.generation += 1;

        if job.clean_jobs() {
            self.clean_generation = self.generation;
        }

        let target = self.share_target(&job);

        let network_difficulty = job.network_target().difficulty();
        let share_difficulty = target.difficulty();

        info!(
            "New job {} (clean_jobs={}): network difficulty {:.4}, share difficulty {:.4}",
            job.job_id(),
            job.clean_jobs(),
            network_difficulty,
            share_difficulty
        );

        info!(
            "Hash rate for one share per {}s: {}",
            BLOCK_TIME.as_secs(),
            HashRate::for_difficulty(share_difficulty, BLOCK_TIME)
        );

        self.start_workers(job, target);
    }

    fn handle_set_difficulty(&mut self, difficulty: Difficulty) {
        info!("Pool difficulty set to {difficulty}, effective from the next job");
        self.pool_difficulty = Some(difficulty);
    }

    /// Pool difficulty (or the job's nbits until the pool sends one) scaled by
    /// the share factor, then clamped to `min_diff` if that is stricter.
    fn share_target(&self, job: &Job) -> Target {
        let base = self
            .pool_difficulty
            .map(Difficulty::to_target)
            .unwrap_or_else(|| job.network_target());

        let target = base.scale(self.options.share_factor);

        match self.options.min_diff {
            Some(min_diff) => target.min(Target::from_difficulty(min_diff)),
            None => target,
        }
    }

    fn start_workers(&mut self, job: Arc<Job>, target: Target) {
        self.stop_workers();

        let cancel = self.cancel.child_token();
        let searcher = NonceSearcher::new(self.hasher.clone(), self.metrics.clone());
        let ranges = NonceRange::FULL.partition(self.options.cpu_cores);
        let workers = ranges.len();

        debug!("Starting {workers} workers on job {}", job.job_id());

        for (id, range) in ranges.into_iter().enumerate() {
            let worker = Worker {
                id,
                workers,
                generation: self.generation,
                job: job.clone(),
                target,
                range,
                searcher: searcher.clone(),
                shares: self.share_tx.clone(),
                cancel: cancel.clone(),
            };

            task::spawn_blocking(move || worker.run());
        }

        self.mining_cancel = Some(cancel);
        self.set_state(State::Mining);
    }

    fn stop_workers(&mut self) {
        if let Some(cancel) = self.mining_cancel.take() {
            cancel.cancel();
            debug!("Cancelled workers for previous job");
        }
    }

    fn handle_submit_response(
        &self,
        found: FoundShare,
        response: Result<SubmitResponse, ClientError>,
    ) -> Option<Share> {
        let job_id = found.job.job_id();

        let rejection = match response {
            Ok(SubmitResponse::Accepted) => {
                self.metrics.add_accepted();
                info!("Share for job {job_id} accepted");
                None
            }
            Ok(SubmitResponse::Rejected(rejection)) => {
                self.metrics.add_rejected();

                match &rejection {
                    Rejection::LowDifficulty { .. } => {
                        warn!("Share for job {job_id} rejected as {rejection}")
                    }
                    _ => warn!("Share for job {job_id} rejected: {rejection}"),
                }

                Some(rejection.to_string())
            }
            Err(err) => {
                warn!("Submission for job {job_id} got no verdict: {err}");
                return None;
            }
        };

        let mut hash = found.hash;
        hash.reverse();

        Some(Share {
            job_id: job_id.clone(),
            extranonce1: found.job.extranonce1.clone(),
            extranonce2: found.extranonce2,
            ntime: found.job.ntime(),
            nonce: found.nonce,
            username: self.options.username.clone(),
            hash: hex::encode(hash),
            accepted: rejection.is_none(),
            rejection,
        })
    }

    fn set_state(&mut self, state: State) {
        if self.state != state {
            debug!("Session state {} -> {}", self.state, state);
            self.state = state;
        }
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        stratum::Message,
        tokio::{
            io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines},
            net::{
                TcpListener,
                tcp::{OwnedReadHalf, OwnedWriteHalf},
            },
            sync::oneshot,
            task::JoinHandle,
        },
    };

    const EASY_NOTIFY: &str = r#"{"id":null,"method":"mining.notify","params":["bf","0000000000000000000000000000000000000000000000000000000000000000","01000000010000000000000000000000000000000000000000000000000000000000000000ffffffff","ffffffff0100f2052a010000000000000000",[],"20000000","207fffff","66e4b7c0",true]}"#;

    async fn session(
        address: String,
        options: SessionOptions,
    ) -> (JoinHandle<Result<Outcome>>, CancellationToken) {
        let (client, events) = Client::connect(ClientConfig {
            address,
            username: options.username.clone(),
            password: Some("x".into()),
            timeout: Duration::from_secs(5),
        })
        .await
        .unwrap();

        let cancel = CancellationToken::new();

        let controller = Controller::new(client, events, options, Arc::new(Sha256d), cancel.clone());

        (tokio::spawn(controller.run()), cancel)
    }

    fn options(once: bool) -> SessionOptions {
        SessionOptions {
            username: "alice.worker".into(),
            cpu_cores: 1,
            share_factor: 1.0,
            min_diff: None,
            once,
        }
    }

    async fn read_request(lines: &mut Lines<BufReader<OwnedReadHalf>>) -> Value {
        serde_json::from_str(&lines.next_line().await.unwrap().unwrap()).unwrap()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn submits_share_meeting_engineered_target() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();

        let (submit_tx, submit_rx) = oneshot::channel();

        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let (reader, mut writer) = stream.into_split();
            let mut lines = BufReader::new(reader).lines();

            let subscribe = read_request(&mut lines).await;
            assert_eq!(subscribe["method"], "mining.subscribe");
            writer
                .write_all(
                    format!(
                        "{}\n",
                        json!({"id": subscribe["id"], "result": [[["mining.notify", "ae6812eb4cd7735a302a8a9dd95cf71f"]], "08000002", 4], "error": null})
                    )
                    .as_bytes(),
                )
                .await
                .unwrap();

            let authorize = read_request(&mut lines).await;
            assert_eq!(authorize["method"], "mining.authorize");
            assert_eq!(authorize["params"], json!(["alice.worker", "x"]));
            writer
                .write_all(
                    format!("{}\n", json!({"id": authorize["id"], "result": true, "error": null}))
                        .as_bytes(),
                )
                .await
                .unwrap();

            writer
                .write_all(format!("{EASY_NOTIFY}\n").as_bytes())
                .await
                .unwrap();

            let submit = read_request(&mut lines).await;
            assert_eq!(submit["method"], "mining.submit");

            writer
                .write_all(
                    format!(
                        "{}\n",
                        json!({"id": submit["id"], "result": false, "error": [23, "low difficulty share", 0.5]})
                    )
                    .as_bytes(),
                )
                .await
                .unwrap();

            submit_tx.send(submit).unwrap();

            while let Ok(Some(_)) = lines.next_line().await {}
        });

        let (session, _cancel) = session(address, options(true)).await;

        let submit = submit_rx.await.unwrap();
        let outcome = session.await.unwrap().unwrap();

        let params = submit["params"].as_array().unwrap();
        assert_eq!(params[0], "alice.worker");
        assert_eq!(params[1], "bf");
        assert_eq!(params[3], "66e4b7c0");

        let Message::Notification { params: notify, .. } =
            serde_json::from_str::<Message>(EASY_NOTIFY).unwrap()
        else {
            panic!("expected notification");
        };

        let job = Job::new(
            serde_json::from_value(notify).unwrap(),
            Extranonce::from_hex("08000002").unwrap(),
            4,
        );

        let extranonce2 = Extranonce::from_hex(params[2].as_str().unwrap()).unwrap();
        let nonce = params[4].as_str().unwrap().parse::<Nonce>().unwrap();
        let header = job.build_header(&Sha256d, &extranonce2, nonce).unwrap();

        assert!(job.network_target().is_met_by(&Sha256d.hash(&header)));

        let Outcome::Done(share) = outcome else {
            panic!("expected a share, got {outcome:?}");
        };

        assert_eq!(share.job_id.as_str(), "bf");
        assert!(!share.accepted);
        assert_eq!(
            share.rejection.as_deref(),
            Some("low difficulty share (pool difficulty 0.5)")
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn pool_hangup_ends_session_as_disconnected() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();

        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let (reader, mut writer) = stream.into_split();
            let mut lines = BufReader::new(reader).lines();

            let subscribe = read_request(&mut lines).await;
            writer
                .write_all(
                    format!(
                        "{}\n",
                        json!({"id": subscribe["id"], "result": [[], "00", 2], "error": null})
                    )
                    .as_bytes(),
                )
                .await
                .unwrap();

            let authorize = read_request(&mut lines).await;
            writer
                .write_all(
                    format!("{}\n", json!({"id": authorize["id"], "result": false, "error": null}))
                        .as_bytes(),
                )
                .await
                .unwrap();
        });

        let (session, _cancel) = session(address, options(false)).await;

        assert!(matches!(
            session.await.unwrap().unwrap(),
            Outcome::Disconnected
        ));
    }

    #[tokio::test]
    async fn cancel_ends_session() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();

        let pool = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
            drop(stream);
        });

        let (session, cancel) = session(address, options(false)).await;

        cancel.cancel();

        assert!(matches!(session.await.unwrap().unwrap(), Outcome::Cancelled));

        pool.abort();
    }

    #[tokio::test]
    async fn share_target_policy() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();

        let (client, events) = Client::connect(ClientConfig {
            address,
            username: "alice".into(),
            password: None,
            timeout: Duration::from_secs(5),
        })
        .await
        .unwrap();

        let mut controller = Controller::new(
            client,
            events,
            SessionOptions {
                share_factor: 2.0,
                ..options(false)
            },
            Arc::new(Sha256d),
            CancellationToken::new(),
        );

        let notify = serde_json::from_str::<Message>(EASY_NOTIFY).unwrap();
        let Message::Notification { params, .. } = notify else {
            panic!("expected notification");
        };
        let job = Job::new(serde_json::from_value(params).unwrap(), Extranonce::default(), 4);

        assert_eq!(
            controller.share_target(&job),
            job.network_target().scale(2.0)
        );

        controller.handle_set_difficulty(Difficulty::new(4.0).unwrap());
        assert_eq!(
            controller.share_target(&job),
            Target::from_difficulty(4.0).scale(2.0)
        );

        controller.options.min_diff = Some(1000.0);
        assert_eq!(
            controller.share_target(&job),
            Target::from_difficulty(1000.0)
        );

        controller.options.min_diff = Some(0.001);
        assert_eq!(
            controller.share_target(&job),
            Target::from_difficulty(4.0).scale(2.0)
        );
    }

    /// Engineered job with nbits 207fffff: half of all hashes meet it.
    fn notify(job_id: &str, clean_jobs: bool) -> Value {
        json!([
            job_id,
            "0000000000000000000000000000000000000000000000000000000000000000",
            "01000000010000000000000000000000000000000000000000000000000000000000000000ffffffff",
            "ffffffff0100f2052a010000000000000000",
            [],
            "20000000",
            "207fffff",
            "66e4b7c0",
            clean_jobs
        ])
    }

    /// Pool difficulty for which no hash is ever good enough.
    const UNREACHABLE_DIFFICULTY: f64 = 1e30;

    /// Roughly one share per 4096 hashes.
    const EASY_DIFFICULTY: f64 = 0.000001;

    struct Pool {
        lines: Lines<BufReader<OwnedReadHalf>>,
        writer: OwnedWriteHalf,
    }

    impl Pool {
        async fn accept(listener: TcpListener) -> Self {
            let (stream, _) = listener.accept().await.unwrap();
            let (reader, writer) = stream.into_split();

            Self {
                lines: BufReader::new(reader).lines(),
                writer,
            }
        }

        async fn recv(&mut self) -> Value {
            read_request(&mut self.lines).await
        }

        async fn send(&mut self, message: Value) {
            self.writer
                .write_all(format!("{message}\n").as_bytes())
                .await
                .unwrap();
        }

        async fn handshake(&mut self) {
            let subscribe = self.recv().await;
            assert_eq!(subscribe["method"], "mining.subscribe");
            self.send(json!({"id": subscribe["id"], "result": [[], "08000002", 4], "error": null}))
                .await;

            let authorize = self.recv().await;
            assert_eq!(authorize["method"], "mining.authorize");
            self.send(json!({"id": authorize["id"], "result": true, "error": null}))
                .await;
        }

        async fn set_difficulty(&mut self, difficulty: f64) {
            self.send(json!({"id": null, "method": "mining.set_difficulty", "params": [difficulty]}))
                .await;
        }

        async fn notify(&mut self, job_id: &str, clean_jobs: bool) {
            self.send(json!({"id": null, "method": "mining.notify", "params": notify(job_id, clean_jobs)}))
                .await;
        }

        /// Next `mining.submit`, answered with `result`/`error`.
        async fn answer_submit(&mut self, result: bool, error: Value) -> Value {
            let submit = self.recv().await;
            assert_eq!(submit["method"], "mining.submit");
            self.send(json!({"id": submit["id"], "result": result, "error": error}))
                .await;
            submit
        }
    }

    async fn idle_controller(options: SessionOptions) -> (Controller, TcpListener) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();

        let (client, events) = Client::connect(ClientConfig {
            address: listener.local_addr().unwrap().to_string(),
            username: options.username.clone(),
            password: None,
            timeout: Duration::from_secs(5),
        })
        .await
        .unwrap();

        let controller = Controller::new(client, events, options, Arc::new(Sha256d), CancellationToken::new());

        (controller, listener)
    }

    fn found_share(generation: u64, job: &Arc<Job>) -> FoundShare {
        FoundShare {
            generation,
            job: job.clone(),
            extranonce2: job.extranonce2(0),
            nonce: Nonce::from(0),
            hash: [0; 32],
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn clean_job_cancels_running_workers() {
        let (mut controller, _listener) = idle_controller(options(false)).await;

        controller.handle_set_difficulty(Difficulty::new(UNREACHABLE_DIFFICULTY).unwrap());

        controller.handle_notify(serde_json::from_value(notify("aa", false)).unwrap());
        let first = controller.mining_cancel.clone().unwrap();
        assert!(!first.is_cancelled());
        assert_eq!(controller.state, State::Mining);

        controller.handle_notify(serde_json::from_value(notify("bb", true)).unwrap());
        let second = controller.mining_cancel.clone().unwrap();

        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());
        assert_eq!(controller.generation, 2);
        assert_eq!(controller.clean_generation, 2);

        controller.stop_workers();
        assert!(second.is_cancelled());
    }

    #[tokio::test]
    async fn shares_from_before_a_clean_job_are_not_submitted() {
        let (mut controller, _listener) = idle_controller(options(false)).await;

        controller.handle_set_difficulty(Difficulty::new(UNREACHABLE_DIFFICULTY).unwrap());

        let job = Arc::new(Job::new(
            serde_json::from_value(notify("aa", false)).unwrap(),
            Extranonce::from_hex("08000002").unwrap(),
            4,
        ));

        controller.handle_notify(serde_json::from_value(notify("aa", false)).unwrap());
        assert!(controller.submission(found_share(1, &job)).is_some());

        controller.handle_notify(serde_json::from_value(notify("bb", true)).unwrap());
        assert!(controller.submission(found_share(1, &job)).is_none());
        assert!(controller.submission(found_share(2, &job)).is_some());

        controller.handle_notify(serde_json::from_value(notify("cc", false)).unwrap());
        assert!(controller.submission(found_share(1, &job)).is_none());
        assert!(controller.submission(found_share(2, &job)).is_some());
        assert!(controller.submission(found_share(3, &job)).is_some());

        controller.stop_workers();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn clean_job_preempts_unreachable_job() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();

        let (jobs_tx, jobs_rx) = oneshot::channel();

        tokio::spawn(async move {
            let mut pool = Pool::accept(listener).await;
            pool.handshake().await;

            pool.set_difficulty(UNREACHABLE_DIFFICULTY).await;
            pool.notify("aa", true).await;

            tokio::time::sleep(Duration::from_millis(200)).await;

            pool.set_difficulty(EASY_DIFFICULTY).await;
            pool.notify("bb", true).await;

            let mut jobs = Vec::new();
            for _ in 0..3 {
                let submit = pool.answer_submit(true, Value::Null).await;
                jobs.push(submit["params"][1].as_str().unwrap().to_owned());
            }

            jobs_tx.send(jobs).unwrap();

            while let Ok(Some(_)) = pool.lines.next_line().await {}
        });

        let (session, cancel) = session(address, options(false)).await;

        assert_eq!(jobs_rx.await.unwrap(), ["bb", "bb", "bb"]);

        cancel.cancel();

        assert!(matches!(session.await.unwrap().unwrap(), Outcome::Cancelled));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn rejected_share_does_not_end_session() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();

        let (accepted_tx, accepted_rx) = oneshot::channel();

        tokio::spawn(async move {
            let mut pool = Pool::accept(listener).await;
            pool.handshake().await;

            pool.set_difficulty(EASY_DIFFICULTY).await;
            pool.notify("bf", true).await;

            let rejected = pool
                .answer_submit(false, json!([23, "low difficulty share", 0.5]))
                .await;
            assert_eq!(rejected["params"][1], "bf");

            pool.notify("c2", true).await;

            loop {
                let submit = pool.answer_submit(true, Value::Null).await;

                if submit["params"][1] == "c2" {
                    accepted_tx.send(submit).unwrap();
                    break;
                }
            }

            while let Ok(Some(_)) = pool.lines.next_line().await {}
        });

        let (session, cancel) = session(address, options(false)).await;

        let submit = accepted_rx.await.unwrap();
        assert_eq!(submit["params"][0], "alice.worker");
        assert!(!session.is_finished());

        cancel.cancel();

        assert!(matches!(session.await.unwrap().unwrap(), Outcome::Cancelled));
    }
}
