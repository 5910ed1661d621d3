use {super::*, crate::options::Options};

#[derive(Clone, Debug, Default, Parser)]
pub(crate) struct Init {
    #[arg(long, help = "Overwrite an existing config file.")]
    pub(crate) force: bool,
}

impl Init {
    pub(crate) fn run(self, options: Options) -> Result {
        let settings = Settings::from_options(&options);
        let path = settings.config_path();

        ensure!(
            self.force || !path.exists(),
            "config file `{}` already exists, pass --force to overwrite it",
            path.display()
        );

        let stdin = io::stdin();
        let stdout = io::stdout();

        let settings = prompt(settings, &mut stdin.lock(), &mut stdout.lock())?;

        settings.to_config().save(&path)?;

        info!("Wrote {}", path.display());

        Ok(())
    }
}

/// Ask for every field the flags left unset.
fn prompt(settings: Settings, input: &mut impl BufRead, output: &mut impl Write) -> Result<Settings> {
    let mut prompter = Prompter { input, output };

    let connection_type = match settings.connection_type {
        Some(connection_type) => connection_type,
        None => prompter.ask("Connection type (stratum/rpc)", Some("stratum"), |answer| {
            answer.parse::<ConnectionType>()
        })?,
    };

    let pool_address = match settings.pool_address.clone() {
        Some(pool_address) => pool_address,
        None => {
            let label = match connection_type {
                ConnectionType::Stratum => "Pool address",
                ConnectionType::Rpc => "Node address",
            };

            prompter.ask(label, None, non_empty)?
        }
    };

    let mut settings = Settings {
        connection_type: Some(connection_type),
        pool_address: Some(pool_address),
        ..settings
    }
    .normalize()?;

    match connection_type {
        ConnectionType::Stratum => {
            if settings.pool_port.is_none() {
                settings.pool_port = Some(prompter.ask("Pool port", None, parse_port)?);
            }

            if settings.username.is_none() {
                settings.username = Some(prompter.ask("User name", None, non_empty)?);
            }

            if settings.password.is_none() {
                settings.password = Some(prompter.ask("Password", Some("x"), non_empty)?);
            }

            if settings.min_diff.is_none() {
                settings.min_diff = Some(prompter.ask(
                    "Minimum difficulty (0 for none)",
                    Some("0"),
                    parse_min_diff,
                )?);
            }
        }
        ConnectionType::Rpc => {
            if settings.rpc_user.is_none() {
                settings.rpc_user = Some(prompter.ask("RPC user", None, non_empty)?);
            }

            if settings.rpc_password.is_none() {
                settings.rpc_password = Some(prompter.ask("RPC password", None, non_empty)?);
            }

            if settings.rpc_port.is_none() {
                settings.rpc_port = Some(prompter.ask("RPC port", Some("8332"), parse_port)?);
            }
        }
    }

    let settings = settings.or_defaults();

    settings.validate()?;

    Ok(settings)
}

struct Prompter<'a, R, W> {
    input: &'a mut R,
    output: &'a mut W,
}

impl<R: BufRead, W: Write> Prompter<'_, R, W> {
    /// Re-prompts until `parse` accepts the answer. An empty answer takes
    /// `default` when there is one.
    fn ask<T>(
        &mut self,
        label: &str,
        default: Option<&str>,
        parse: impl Fn(&str) -> Result<T>,
    ) -> Result<T> {
        loop {
            match default {
                Some(default) => write!(self.output, "{label} [{default}]: ")?,
                None => write!(self.output, "{label}: ")?,
            }
            self.output.flush()?;

            let mut line = String::new();

            if self.input.read_line(&mut line)? == 0 {
                bail!("unexpected end of input while reading {}", label.to_lowercase());
            }

            let answer = match (line.trim(), default) {
                ("", Some(default)) => default,
                (answer, _) => answer,
            };

            match parse(answer) {
                Ok(value) => return Ok(value),
                Err(err) => writeln!(self.output, "invalid {}: {err}", label.to_lowercase())?,
            }
        }
    }
}

fn non_empty(answer: &str) -> Result<String> {
    ensure!(!answer.is_empty(), "must not be empty");
    Ok(answer.into())
}

fn parse_port(answer: &str) -> Result<u16> {
    let port = answer
        .parse::<u16>()
        .with_context(|| format!("`{answer}` is not a port number"))?;
    ensure!(port != 0, "port must not be 0");
    Ok(port)
}

fn parse_min_diff(answer: &str) -> Result<f64> {
    let min_diff = answer
        .parse::<f64>()
        .with_context(|| format!("`{answer}` is not a number"))?;
    ensure!(
        min_diff.is_finite() && min_diff >= 0.0,
        "must be a non-negative number"
    );
    Ok(min_diff)
}

#[cfg(test)]
mod tests {
    use {super::*, std::io::Cursor};

    fn run_prompt(settings: Settings, input: &str) -> (Result<Settings>, String) {
        let mut input = Cursor::new(input.as_bytes().to_vec());
        let mut output = Vec::new();
        let result = prompt(settings, &mut input, &mut output);
        (result, String::from_utf8(output).unwrap())
    }

    #[test]
    fn stratum_prompts() {
        let (settings, output) = run_prompt(
            Settings::default(),
            "\nstratum+tcp://pool.example.com\n3333\nalice.worker\n\n\n",
        );

        let settings = settings.unwrap();

        assert_eq!(settings.connection_type, Some(ConnectionType::Stratum));
        assert_eq!(settings.pool_endpoint().unwrap(), "pool.example.com:3333");
        assert_eq!(settings.username().unwrap(), "alice.worker");
        assert_eq!(settings.password(), "x");
        assert_eq!(settings.min_diff, Some(0.0));

        assert_eq!(
            output,
            "Connection type (stratum/rpc) [stratum]: \
             Pool address: \
             Pool port: \
             User name: \
             Password [x]: \
             Minimum difficulty (0 for none) [0]: "
        );
    }

    #[test]
    fn address_with_port_skips_port_prompt() {
        let (settings, output) = run_prompt(
            Settings {
                username: Some("alice".into()),
                ..Default::default()
            },
            "stratum\npool.example.com:4444\nhunter2\n0.5\n",
        );

        let settings = settings.unwrap();

        assert_eq!(settings.pool_port, Some(4444));
        assert_eq!(settings.password(), "hunter2");
        assert_eq!(settings.min_diff(), Some(0.5));
        assert!(!output.contains("Pool port"), "{output}");
        assert!(!output.contains("User name"), "{output}");
    }

    #[test]
    fn invalid_answers_are_asked_again() {
        let (settings, output) = run_prompt(
            Settings::default(),
            "solo\nstratum\npool.example.com\n99999\nport\n3333\nalice\nx\n-1\n1\n",
        );

        let settings = settings.unwrap();

        assert_eq!(settings.pool_port, Some(3333));
        assert_eq!(settings.min_diff, Some(1.0));
        assert_eq!(output.matches("invalid connection type").count(), 1);
        assert_eq!(output.matches("invalid pool port").count(), 2);
        assert_eq!(output.matches("invalid minimum difficulty").count(), 1);
    }

    #[test]
    fn rpc_prompts() {
        let (settings, output) = run_prompt(
            Settings::default(),
            "rpc\n127.0.0.1\nbitcoin\nhunter2\n\n",
        );

        let settings = settings.unwrap();

        assert_eq!(settings.connection_type, Some(ConnectionType::Rpc));
        assert_eq!(settings.rpc_credentials(), Some(("bitcoin", "hunter2")));
        assert_eq!(settings.rpc_url().unwrap(), "http://127.0.0.1:8332/");
        assert!(output.contains("Node address: "), "{output}");
        assert!(!output.contains("User name"), "{output}");
    }

    #[test]
    fn end_of_input_is_an_error() {
        let (result, _) = run_prompt(Settings::default(), "stratum\n");

        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("unexpected end of input while reading pool address")
        );
    }
}
