use {
    super::*,
    controller::{Controller, Outcome, SessionOptions},
    metrics::Metrics,
    sysinfo::System,
};

mod controller;
mod metrics;
mod searcher;

const CONNECT_ATTEMPTS: usize = 5;
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const RETRY_DELAY: Duration = Duration::from_secs(5);
const RECONNECT_DELAY: Duration = Duration::from_secs(5);

#[derive(Clone, Debug, Default, Parser)]
pub(crate) struct Miner {
    #[arg(
        long,
        help = "Exit <ONCE> the first share gets a verdict and print it as JSON."
    )]
    pub(crate) once: bool,
}

/// A submitted share and the pool's verdict, as printed by `miner --once`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Share {
    pub job_id: JobId,
    pub extranonce1: Extranonce,
    pub extranonce2: Extranonce,
    pub ntime: Ntime,
    pub nonce: Nonce,
    pub username: String,
    pub hash: String,
    pub accepted: bool,
    pub rejection: Option<String>,
}

impl Miner {
    pub(crate) async fn run(self, settings: Settings, cancel_token: CancellationToken) -> Result {
        if settings.connection_type() == ConnectionType::Rpc {
            info!("Connection type is rpc, polling block templates instead of mining");
            return template::Template { once: self.once }
                .run(settings, cancel_token)
                .await;
        }

        let config = ClientConfig {
            address: settings.pool_endpoint()?,
            username: settings.username()?.into(),
            password: Some(settings.password().into()),
            timeout: CONNECT_TIMEOUT,
        };

        let cpu_cores = cpu_cores(settings.cpu_cores());

        info!(
            "Mining on {} as {} with {} CPU cores",
            config.address, config.username, cpu_cores
        );

        loop {
            let (client, events) = tokio::select! {
                result = connect_with_retry(&config, CONNECT_ATTEMPTS, RETRY_DELAY) => {
                    result.with_context(|| format!("failed to connect to pool at `{}`", config.address))?
                }
                _ = cancel_token.cancelled() => return Ok(()),
            };

            let controller = Controller::new(
                client,
                events,
                SessionOptions {
                    username: config.username.clone(),
                    cpu_cores,
                    share_factor: settings.share_factor(),
                    min_diff: settings.min_diff(),
                    once: self.once,
                },
                Arc::new(Sha256d),
                cancel_token.child_token(),
            );

            match controller.run().await? {
                Outcome::Cancelled => return Ok(()),
                Outcome::Done(share) => {
                    println!("{}", serde_json::to_string_pretty(&share)?);
                    return Ok(());
                }
                Outcome::Disconnected => {
                    let delay = reconnect_delay();

                    warn!(
                        "Disconnected from {}, reconnecting in {}ms",
                        config.address,
                        delay.as_millis()
                    );

                    tokio::select! {
                        _ = sleep(delay) => {}
                        _ = cancel_token.cancelled() => return Ok(()),
                    }
                }
            }
        }
    }
}

fn reconnect_delay() -> Duration {
    if integration_test() {
        Duration::from_millis(100)
    } else {
        RECONNECT_DELAY
    }
}

/// Requested cores, capped at what the machine has; all of them by default.
fn cpu_cores(requested: Option<usize>) -> usize {
    let mut system = System::new();
    system.refresh_cpu_all();
    let available = system.cpus().len().max(1);

    match requested {
        Some(requested) if requested > available => {
            warn!("Requested {requested} CPU cores but only {available} are available");
            available
        }
        Some(requested) => requested.max(1),
        None => available,
    }
}

#[cfg(test)]
mod tests {
    use {super::*, crate::arguments::Arguments, crate::subcommand::Subcommand};

    fn parse(args: &str) -> Arguments {
        match Arguments::try_parse_from(args.split_whitespace()) {
            Ok(arguments) => arguments,
            Err(err) => panic!("error parsing arguments: {err}"),
        }
    }

    fn parse_miner_args(args: &str) -> Miner {
        match parse(args).subcommand {
            Subcommand::Miner(miner) => miner,
            subcommand => panic!("unexpected subcommand: {subcommand:?}"),
        }
    }

    #[test]
    fn parse_args() {
        assert!(!parse_miner_args("shovel miner").once);
        assert!(parse_miner_args("shovel miner --once").once);
    }

    #[test]
    fn global_options_after_subcommand() {
        let arguments = parse(
            "shovel miner \
                --pool-address stratum+tcp://pool.example.com:3333 \
                --username bc1q8jx6g9ujlqmdx3jnt3ap6ll2fdwqjdkdgs959m.worker1 \
                --cpu-cores 8",
        );

        assert_eq!(arguments.options.cpu_cores, Some(8));
        assert_eq!(
            arguments.options.pool_address.as_deref(),
            Some("stratum+tcp://pool.example.com:3333")
        );
    }

    #[test]
    fn cpu_cores_are_capped() {
        let available = cpu_cores(None);
        assert!(available >= 1);
        assert_eq!(cpu_cores(Some(usize::MAX)), available);
        assert_eq!(cpu_cores(Some(1)), 1);
    }

    #[test]
    fn share_json() {
        let share = Share {
            job_id: "bf".into(),
            extranonce1: Extranonce::from_hex("08000002").unwrap(),
            extranonce2: Extranonce::from_hex("00000000").unwrap(),
            ntime: "66e4b7c0".parse().unwrap(),
            nonce: Nonce::from(1),
            username: "alice".into(),
            hash: "00".repeat(32),
            accepted: true,
            rejection: None,
        };

        let json = serde_json::to_value(&share).unwrap();

        assert_eq!(json["extranonce1"], "08000002");
        assert_eq!(json["nonce"], "01000000");
        assert_eq!(json["ntime"], "66e4b7c0");
        assert_eq!(serde_json::from_value::<Share>(json).unwrap(), share);
    }
}
