use super::*;

const POLL_INTERVAL: Duration = Duration::from_secs(10);
const ERROR_BACKOFF: Duration = Duration::from_secs(30);
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone, Debug, Default, Parser)]
pub(crate) struct Template {
    #[arg(long, help = "Print the first template summary as JSON and exit <ONCE>.")]
    pub(crate) once: bool,
}

/// What gets logged about each `getblocktemplate` result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub height: u64,
    pub previous_block_hash: String,
    pub transactions: usize,
    pub bits: Option<String>,
    pub coinbase_value: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<BlockTemplate>,
    error: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct BlockTemplate {
    height: u64,
    #[serde(rename = "previousblockhash")]
    previous_block_hash: String,
    #[serde(default)]
    transactions: Vec<Value>,
    bits: Option<String>,
    #[serde(rename = "coinbasevalue")]
    coinbase_value: Option<u64>,
}

impl From<BlockTemplate> for Summary {
    fn from(template: BlockTemplate) -> Self {
        Self {
            height: template.height,
            previous_block_hash: template.previous_block_hash,
            transactions: template.transactions.len(),
            bits: template.bits,
            coinbase_value: template.coinbase_value,
        }
    }
}

impl Template {
    pub(crate) async fn run(self, settings: Settings, cancel_token: CancellationToken) -> Result {
        let url = settings.rpc_url()?;

        let (user, password) = settings
            .rpc_credentials()
            .ok_or_else(|| anyhow!("RPC mode requires an RPC user and password"))?;

        let client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .context("failed to build HTTP client")?;

        info!("Polling getblocktemplate at {url}");

        loop {
            let delay = match get_block_template(&client, &url, user, password).await {
                Ok(summary) => {
                    info!(
                        "Block template at height {}: previous block {}, {} transactions",
                        summary.height, summary.previous_block_hash, summary.transactions
                    );

                    if self.once {
                        println!("{}", serde_json::to_string_pretty(&summary)?);
                        return Ok(());
                    }

                    POLL_INTERVAL
                }
                Err(err) if self.once => return Err(err),
                Err(err) => {
                    warn!(
                        "getblocktemplate failed: {err:#}, retrying in {}s",
                        ERROR_BACKOFF.as_secs()
                    );
                    ERROR_BACKOFF
                }
            };

            tokio::select! {
                _ = sleep(delay) => {}
                _ = cancel_token.cancelled() => {
                    info!("Shutting down template poller");
                    return Ok(());
                }
            }
        }
    }
}

async fn get_block_template(
    client: &reqwest::Client,
    url: &str,
    user: &str,
    password: &str,
) -> Result<Summary> {
    let response = client
        .post(url)
        .basic_auth(user, Some(password))
        .json(&json!({
            "jsonrpc": "1.0",
            "id": "shovel",
            "method": "getblocktemplate",
            "params": [{"rules": ["segwit"]}]
        }))
        .send()
        .await
        .with_context(|| format!("failed to reach node at {url}"))?;

    let status = response.status();

    let response = response
        .json::<RpcResponse>()
        .await
        .with_context(|| format!("invalid getblocktemplate response with status {status}"))?;

    if let Some(error) = response.error.filter(|error| !error.is_null()) {
        bail!("node returned error: {error}");
    }

    response
        .result
        .map(Summary::from)
        .ok_or_else(|| anyhow!("getblocktemplate response without result"))
}
