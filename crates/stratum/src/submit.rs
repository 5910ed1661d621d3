use super::*;

/// Params of `mining.submit`: `[username, job_id, extranonce2, ntime, nonce]`.
#[derive(Debug, PartialEq, Clone)]
pub struct Submit {
    pub username: String,
    pub job_id: JobId,
    pub extranonce2: Extranonce,
    pub ntime: Ntime,
    pub nonce: Nonce,
}

impl Serialize for Submit {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(5))?;
        seq.serialize_element(&self.username)?;
        seq.serialize_element(&self.job_id)?;
        seq.serialize_element(&self.extranonce2)?;
        seq.serialize_element(&self.ntime)?;
        seq.serialize_element(&self.nonce)?;
        seq.end()
    }
}

impl<'de> Deserialize<'de> for Submit {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let (username, job_id, extranonce2, ntime, nonce) =
            <(String, JobId, Extranonce, Ntime, Nonce)>::deserialize(deserializer)?;

        Ok(Submit {
            username,
            job_id,
            extranonce2,
            ntime,
            nonce,
        })
    }
}

/// Why the pool declined a share.
#[derive(Debug, Clone, PartialEq)]
pub enum Rejection {
    /// The share missed the pool target. Carries the pool's difficulty when
    /// the error triple includes it.
    LowDifficulty { difficulty: Option<f64> },
    Stratum { code: i32, message: String },
    Reason(String),
    Unknown,
}

impl Display for Rejection {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::LowDifficulty {
                difficulty: Some(difficulty),
            } => write!(f, "low difficulty share (pool difficulty {difficulty})"),
            Rejection::LowDifficulty { difficulty: None } => write!(f, "low difficulty share"),
            Rejection::Stratum { code, message } => write!(f, "error {code}: {message}"),
            Rejection::Reason(reason) => write!(f, "{reason}"),
            Rejection::Unknown => write!(f, "no reason given"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitResponse {
    Accepted,
    Rejected(Rejection),
}

impl SubmitResponse {
    pub fn classify(
        result: Option<&Value>,
        error: Option<&JsonRpcError>,
        reject_reason: Option<&str>,
    ) -> Self {
        if let Some(error) = error {
            return SubmitResponse::Rejected(if error.error_code == LOW_DIFFICULTY_SHARE {
                Rejection::LowDifficulty {
                    difficulty: error.traceback.as_ref().and_then(Value::as_f64),
                }
            } else {
                Rejection::Stratum {
                    code: error.error_code,
                    message: error.message.clone(),
                }
            });
        }

        if result == Some(&Value::Bool(true)) {
            return SubmitResponse::Accepted;
        }

        match reject_reason {
            Some(reason) => SubmitResponse::Rejected(Rejection::Reason(reason.into())),
            None => SubmitResponse::Rejected(Rejection::Unknown),
        }
    }

    /// Classify a response message. Anything that is not a response is treated
    /// as a rejection without detail.
    pub fn from_message(message: &Message) -> Self {
        match message {
            Message::Response {
                result,
                error,
                reject_reason,
                ..
            } => Self::classify(result.as_ref(), error.as_ref(), reject_reason.as_deref()),
            _ => SubmitResponse::Rejected(Rejection::Unknown),
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, SubmitResponse::Accepted)
    }
}
