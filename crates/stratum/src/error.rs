use super::*;

pub type Result<T = (), E = InternalError> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum InternalError {
    #[snafu(display("malformed target `{nbits}`: {reason}"))]
    MalformedTarget { nbits: String, reason: String },

    #[snafu(display("malformed job field `{field}`: {reason}"))]
    MalformedJob { field: &'static str, reason: String },

    #[snafu(display("{message}"))]
    Parse { message: String },

    #[snafu(display("invalid hex: {source}"))]
    Hex { source: hex::FromHexError },
}

/// The `[code, message, data]` error triple carried by stratum responses.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonRpcError {
    pub error_code: i32,
    pub message: String,
    pub traceback: Option<Value>,
}

impl Serialize for JsonRpcError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (&self.error_code, &self.message, &self.traceback).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for JsonRpcError {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            Full((i32, String, Option<Value>)),
            Short((i32, String)),
        }

        Ok(match Wire::deserialize(deserializer)? {
            Wire::Full((error_code, message, traceback)) => JsonRpcError {
                error_code,
                message,
                traceback,
            },
            Wire::Short((error_code, message)) => JsonRpcError {
                error_code,
                message,
                traceback: None,
            },
        })
    }
}

impl Display for JsonRpcError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.traceback {
            Some(traceback) if !traceback.is_null() => write!(
                f,
                "Stratum error {}: {} ({})",
                self.error_code, self.message, traceback
            ),
            _ => write!(f, "Stratum error {}: {}", self.error_code, self.message),
        }
    }
}
