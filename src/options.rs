use super::*;

#[derive(Clone, Default, Debug, Parser)]
pub struct Options {
    #[arg(
        long,
        global = true,
        help = "Load configuration from <CONFIG>. [default: config.json]"
    )]
    pub config: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        value_enum,
        help = "Mine over <CONNECTION_TYPE>. [default: stratum]"
    )]
    pub connection_type: Option<ConnectionType>,

    #[arg(
        long,
        global = true,
        help = "Connect to <POOL_ADDRESS>. Accepts `stratum+tcp://` and `HOST:PORT`."
    )]
    pub pool_address: Option<String>,

    #[arg(long, global = true, help = "Connect to pool on <POOL_PORT>.")]
    pub pool_port: Option<u16>,

    #[arg(
        long,
        global = true,
        alias = "user-name",
        help = "Authorize as <USERNAME>."
    )]
    pub username: Option<String>,

    #[arg(long, global = true, help = "Authorize with <PASSWORD>. [default: x]")]
    pub password: Option<String>,

    #[arg(
        long,
        global = true,
        help = "Only submit shares of at least <MIN_DIFF> difficulty."
    )]
    pub min_diff: Option<f64>,

    #[arg(
        long,
        global = true,
        help = "Divide the share target by <SHARE_FACTOR>. [default: 1.0]"
    )]
    pub share_factor: Option<f64>,

    #[arg(long, global = true, help = "Hash on <CPU_CORES> threads. [default: all]")]
    pub cpu_cores: Option<usize>,

    #[arg(long, global = true, help = "Authenticate to node RPC as <RPC_USER>.")]
    pub rpc_user: Option<String>,

    #[arg(long, global = true, help = "Authenticate to node RPC with <RPC_PASSWORD>.")]
    pub rpc_password: Option<String>,

    #[arg(long, global = true, help = "Connect to node RPC on <RPC_PORT>. [default: 8332]")]
    pub rpc_port: Option<u16>,
}
