use {super::*, crate::options::Options};

pub(crate) mod init;
pub mod miner;
pub mod template;

#[derive(Debug, Parser)]
pub(crate) enum Subcommand {
    #[command(about = "Mine on a Stratum pool, or poll a node in rpc mode")]
    Miner(miner::Miner),
    #[command(about = "Prompt for settings and write the config file")]
    Init(init::Init),
    #[command(about = "Poll a node's block template over RPC")]
    Template(template::Template),
}

impl Subcommand {
    pub(crate) async fn run(self, options: Options, cancel_token: CancellationToken) -> Result {
        match self {
            Self::Init(init) => init.run(options),
            Self::Miner(miner) => {
                let settings = Settings::load(options)?;
                settings.validate()?;
                miner.run(settings, cancel_token).await
            }
            Self::Template(template) => {
                let settings = Settings::load(options)?;
                settings.validate_for(ConnectionType::Rpc)?;
                template.run(settings, cancel_token).await
            }
        }
    }
}
