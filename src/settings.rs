use {super::*, crate::options::Options};

const DEFAULT_CONFIG_FILE: &str = "config.json";
const DEFAULT_PASSWORD: &str = "x";
const DEFAULT_RPC_PORT: u16 = 8332;
const DEFAULT_SHARE_FACTOR: f64 = 1.0;
const STRATUM_SCHEME: &str = "stratum+tcp://";

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, DeserializeFromStr, SerializeDisplay,
)]
pub enum ConnectionType {
    #[default]
    Stratum,
    Rpc,
}

impl FromStr for ConnectionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "stratum" => Ok(Self::Stratum),
            "rpc" => Ok(Self::Rpc),
            other => bail!("invalid connection type `{other}`, expected `stratum` or `rpc`"),
        }
    }
}

impl Display for ConnectionType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stratum => write!(f, "stratum"),
            Self::Rpc => write!(f, "rpc"),
        }
    }
}

/// `config.json` as written by `shovel init`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub connection_type: Option<ConnectionType>,
    pub pool_address: Option<String>,
    pub pool_port: Option<u16>,
    pub user_name: Option<String>,
    pub password: Option<String>,
    pub min_diff: Option<f64>,
    pub rpc_user: Option<String>,
    pub rpc_password: Option<String>,
    pub rpc_port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub share_factor: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_cores: Option<usize>,
}

/// Resolved configuration. Each field comes from, in order of priority, a
/// command line flag, a `SHOVEL_` environment variable, the config file, or
/// a default.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Settings {
    pub config: Option<PathBuf>,
    pub connection_type: Option<ConnectionType>,
    pub pool_address: Option<String>,
    pub pool_port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub min_diff: Option<f64>,
    pub share_factor: Option<f64>,
    pub cpu_cores: Option<usize>,
    pub rpc_user: Option<String>,
    pub rpc_password: Option<String>,
    pub rpc_port: Option<u16>,
}

impl Settings {
    pub fn load(options: Options) -> Result<Self> {
        let mut env = BTreeMap::<String, String>::new();

        for (var, value) in env::vars_os() {
            let Some(var) = var.to_str() else {
                continue;
            };

            let Some(key) = var.strip_prefix("SHOVEL_") else {
                continue;
            };

            env.insert(
                key.into(),
                value.into_string().map_err(|value| {
                    anyhow!(
                        "environment variable `{var}` not valid unicode: `{}`",
                        value.to_string_lossy()
                    )
                })?,
            );
        }

        Self::merge(options, env)
    }

    pub fn merge(options: Options, env: BTreeMap<String, String>) -> Result<Self> {
        let settings = Self::from_options(&options).or(Self::from_env(&env)?);

        let config = match settings.existing_config_path()? {
            Some(path) => Self::read_config(&path)?,
            None => Config::default(),
        };

        settings
            .or(Self::from_config(&config))
            .or_defaults()
            .normalize()
    }

    fn read_config(path: &Path) -> Result<Config> {
        serde_json::from_str(
            &fs::read_to_string(path)
                .with_context(|| format!("failed to open config file `{}`", path.display()))?,
        )
        .with_context(|| format!("failed to deserialize config file `{}`", path.display()))
    }

    fn existing_config_path(&self) -> Result<Option<PathBuf>> {
        if let Some(path) = &self.config {
            ensure!(
                path.is_file(),
                "config file `{}` does not exist",
                path.display()
            );
            return Ok(Some(path.clone()));
        }

        let path = PathBuf::from(DEFAULT_CONFIG_FILE);

        Ok(path.is_file().then_some(path))
    }

    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(|| DEFAULT_CONFIG_FILE.into())
    }

    pub(crate) fn from_options(options: &Options) -> Self {
        Self {
            config: options.config.clone(),
            connection_type: options.connection_type,
            pool_address: options.pool_address.clone(),
            pool_port: options.pool_port,
            username: options.username.clone(),
            password: options.password.clone(),
            min_diff: options.min_diff,
            share_factor: options.share_factor,
            cpu_cores: options.cpu_cores,
            rpc_user: options.rpc_user.clone(),
            rpc_password: options.rpc_password.clone(),
            rpc_port: options.rpc_port,
        }
    }

    pub fn from_env(env: &BTreeMap<String, String>) -> Result<Self> {
        fn parse<T>(env: &BTreeMap<String, String>, key: &str, ty: &str) -> Result<Option<T>>
        where
            T: FromStr,
            T::Err: Display,
        {
            env.get(key)
                .map(|value| {
                    value.parse::<T>().map_err(|err| {
                        anyhow!("failed to parse environment variable SHOVEL_{key} as {ty}: {err}")
                    })
                })
                .transpose()
        }

        let get_string = |key: &str| env.get(key).filter(|value| !value.is_empty()).cloned();

        Ok(Self {
            config: env.get("CONFIG").map(PathBuf::from),
            connection_type: parse(env, "CONNECTION_TYPE", "connection type")?,
            pool_address: get_string("POOL_ADDRESS"),
            pool_port: parse(env, "POOL_PORT", "u16")?,
            username: get_string("USERNAME"),
            password: get_string("PASSWORD"),
            min_diff: parse(env, "MIN_DIFF", "f64")?,
            share_factor: parse(env, "SHARE_FACTOR", "f64")?,
            cpu_cores: parse(env, "CPU_CORES", "usize")?,
            rpc_user: get_string("RPC_USER"),
            rpc_password: get_string("RPC_PASSWORD"),
            rpc_port: parse(env, "RPC_PORT", "u16")?,
        })
    }

    /// Empty strings are how unused credentials are written to the file, so
    /// they count as unset.
    pub fn from_config(config: &Config) -> Self {
        let non_empty = |value: &Option<String>| value.clone().filter(|value| !value.is_empty());

        Self {
            config: None,
            connection_type: config.connection_type,
            pool_address: non_empty(&config.pool_address),
            pool_port: config.pool_port,
            username: non_empty(&config.user_name),
            password: non_empty(&config.password),
            min_diff: config.min_diff,
            share_factor: config.share_factor,
            cpu_cores: config.cpu_cores,
            rpc_user: non_empty(&config.rpc_user),
            rpc_password: non_empty(&config.rpc_password),
            rpc_port: config.rpc_port,
        }
    }

    pub fn or(self, other: Self) -> Self {
        Self {
            config: self.config.or(other.config),
            connection_type: self.connection_type.or(other.connection_type),
            pool_address: self.pool_address.or(other.pool_address),
            pool_port: self.pool_port.or(other.pool_port),
            username: self.username.or(other.username),
            password: self.password.or(other.password),
            min_diff: self.min_diff.or(other.min_diff),
            share_factor: self.share_factor.or(other.share_factor),
            cpu_cores: self.cpu_cores.or(other.cpu_cores),
            rpc_user: self.rpc_user.or(other.rpc_user),
            rpc_password: self.rpc_password.or(other.rpc_password),
            rpc_port: self.rpc_port.or(other.rpc_port),
        }
    }

    pub(crate) fn or_defaults(self) -> Self {
        Self {
            connection_type: Some(self.connection_type.unwrap_or_default()),
            password: Some(self.password.unwrap_or_else(|| DEFAULT_PASSWORD.into())),
            share_factor: Some(self.share_factor.unwrap_or(DEFAULT_SHARE_FACTOR)),
            rpc_port: Some(self.rpc_port.unwrap_or(DEFAULT_RPC_PORT)),
            ..self
        }
    }

    /// Strip a `stratum+tcp://` scheme and move a trailing `:PORT` into
    /// `pool_port`.
    pub(crate) fn normalize(self) -> Result<Self> {
        let Some(address) = &self.pool_address else {
            return Ok(self);
        };

        let address = address.trim();
        let address = address.strip_prefix(STRATUM_SCHEME).unwrap_or(address);
        let address = address.trim_end_matches('/');

        let (host, port) = match address.rsplit_once(':') {
            Some((host, port)) if !host.contains(':') => {
                let port = port
                    .parse::<u16>()
                    .with_context(|| format!("invalid port in pool address `{address}`"))?;
                (host, Some(port))
            }
            _ => (address, None),
        };

        ensure!(!host.is_empty(), "pool address `{address}` has no host");

        Ok(Self {
            pool_address: Some(host.into()),
            pool_port: port.or(self.pool_port),
            ..self
        })
    }

    pub fn validate(&self) -> Result {
        self.validate_for(self.connection_type())
    }

    /// Check that everything `mode` needs is present and in range.
    pub fn validate_for(&self, mode: ConnectionType) -> Result {
        match (&self.rpc_user, &self.rpc_password) {
            (None, Some(_)) => bail!("RPC password specified without RPC user"),
            (Some(_), None) => bail!("RPC user specified without RPC password"),
            _ => {}
        }

        if let Some(min_diff) = self.min_diff {
            ensure!(
                min_diff.is_finite() && min_diff >= 0.0,
                "min_diff must be a non-negative number, got {min_diff}"
            );
        }

        if let Some(share_factor) = self.share_factor {
            ensure!(
                share_factor.is_finite() && share_factor > 0.0,
                "share_factor must be a positive number, got {share_factor}"
            );
        }

        if self.cpu_cores == Some(0) {
            bail!("cpu_cores must be at least 1");
        }

        ensure!(self.pool_address.is_some(), "no pool address configured");

        match mode {
            ConnectionType::Stratum => {
                ensure!(self.pool_port.is_some(), "no pool port configured");
                ensure!(self.username.is_some(), "no user name configured");
            }
            ConnectionType::Rpc => {
                ensure!(
                    self.rpc_user.is_some(),
                    "RPC mode requires an RPC user and password"
                );
            }
        }

        Ok(())
    }

    pub fn connection_type(&self) -> ConnectionType {
        self.connection_type.unwrap_or_default()
    }

    pub fn pool_endpoint(&self) -> Result<String> {
        match (&self.pool_address, self.pool_port) {
            (Some(address), Some(port)) => Ok(format!("{address}:{port}")),
            (None, _) => Err(anyhow!("no pool address configured")),
            (Some(_), None) => Err(anyhow!("no pool port configured")),
        }
    }

    pub fn username(&self) -> Result<&str> {
        self.username
            .as_deref()
            .ok_or_else(|| anyhow!("no user name configured"))
    }

    pub fn password(&self) -> &str {
        self.password.as_deref().unwrap_or(DEFAULT_PASSWORD)
    }

    /// Zero means no floor.
    pub fn min_diff(&self) -> Option<f64> {
        self.min_diff.filter(|min_diff| *min_diff > 0.0)
    }

    pub fn share_factor(&self) -> f64 {
        self.share_factor.unwrap_or(DEFAULT_SHARE_FACTOR)
    }

    pub fn cpu_cores(&self) -> Option<usize> {
        self.cpu_cores
    }

    pub fn rpc_url(&self) -> Result<String> {
        let address = self
            .pool_address
            .as_deref()
            .ok_or_else(|| anyhow!("no node address configured"))?;

        Ok(format!(
            "http://{address}:{}/",
            self.rpc_port.unwrap_or(DEFAULT_RPC_PORT)
        ))
    }

    pub fn rpc_credentials(&self) -> Option<(&str, &str)> {
        Some((self.rpc_user.as_deref()?, self.rpc_password.as_deref()?))
    }

    pub fn to_config(&self) -> Config {
        Config {
            connection_type: Some(self.connection_type()),
            pool_address: self.pool_address.clone(),
            pool_port: self.pool_port,
            user_name: self.username.clone(),
            password: Some(self.password().into()),
            min_diff: self.min_diff,
            rpc_user: Some(self.rpc_user.clone().unwrap_or_default()),
            rpc_password: Some(self.rpc_password.clone().unwrap_or_default()),
            rpc_port: Some(self.rpc_port.unwrap_or(DEFAULT_RPC_PORT)),
            share_factor: self.share_factor.filter(|f| *f != DEFAULT_SHARE_FACTOR),
            cpu_cores: self.cpu_cores,
        }
    }
}

impl Config {
    /// Write as JSON with four-space indentation.
    pub fn save(&self, path: &Path) -> Result {
        let mut buffer = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);

        self.serialize(&mut serializer)
            .context("failed to serialize config")?;

        buffer.push(b'\n');

        fs::write(path, buffer)
            .with_context(|| format!("failed to write config file `{}`", path.display()))
    }
}
