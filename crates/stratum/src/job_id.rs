use super::*;

/// Pool-assigned job identifier. Opaque: echoed back exactly as received.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for JobId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        Self(s.into())
    }
}

impl From<String> for JobId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_verbatim() {
        let job_id: JobId = serde_json::from_str(r#""00bf""#).unwrap();
        assert_eq!(job_id.as_str(), "00bf");
        assert_eq!(serde_json::to_string(&job_id).unwrap(), r#""00bf""#);
    }
}
