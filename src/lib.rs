use {
    anyhow::{Context, Error, anyhow, bail, ensure},
    arguments::Arguments,
    clap::{Parser, ValueEnum},
    futures::stream::{FuturesUnordered, StreamExt},
    hash_rate::HashRate,
    job::Job,
    serde::{Deserialize, Serialize},
    serde_json::{Value, json},
    serde_with::{DeserializeFromStr, SerializeDisplay},
    settings::{ConnectionType, Settings},
    std::{
        collections::BTreeMap,
        env,
        fmt::{self, Display, Formatter},
        fs,
        io::{self, BufRead, Write},
        path::{Path, PathBuf},
        process,
        str::FromStr,
        sync::{
            Arc,
            atomic::{AtomicU64, Ordering},
        },
        time::{Duration, Instant},
    },
    stratum::{
        Client, ClientConfig, ClientError, Difficulty, DoubleHash, Event, EventReceiver,
        Extranonce, JobId, Nonce, Notify, Ntime, Rejection, Sha256d, Submit, SubmitResponse,
        Target, connect_with_retry, hash_difficulty,
    },
    tokio::{runtime::Runtime, sync::mpsc, task, time::sleep},
    tokio_util::sync::CancellationToken,
    tracing::{debug, error, info, warn},
    tracing_appender::non_blocking,
    tracing_subscriber::EnvFilter,
};

mod arguments;
pub mod hash_rate;
pub mod job;
mod logs;
mod options;
pub mod settings;
mod signal;
pub mod subcommand;

pub const USER_AGENT: &str = concat!("shovel/", env!("CARGO_PKG_VERSION"));

/// Block interval used to turn a difficulty into the hash rate needed for one
/// share per block.
pub const BLOCK_TIME: Duration = Duration::from_secs(60);

type Result<T = (), E = Error> = std::result::Result<T, E>;

fn integration_test() -> bool {
    env::var_os("SHOVEL_INTEGRATION_TEST").is_some()
}

pub fn main() {
    let _guard = logs::init();

    let args = Arguments::parse();

    Runtime::new()
        .expect("Failed to create tokio runtime")
        .block_on(async {
            let cancel_token = signal::setup_signal_handler();

            match args.run(cancel_token).await {
                Err(err) => {
                    eprintln!("error: {err}");

                    for (i, cause) in err.chain().skip(1).enumerate() {
                        if i == 0 {
                            eprintln!();
                            eprintln!("because:");
                        }
                        eprintln!("- {cause}");
                    }

                    if env::var_os("RUST_BACKTRACE")
                        .map(|val| val == "1")
                        .unwrap_or_default()
                    {
                        eprintln!();
                        eprintln!("{}", err.backtrace());
                    }
                    process::exit(1);
                }
                Ok(_) => {
                    process::exit(0);
                }
            }
        });
}
