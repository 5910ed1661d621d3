use super::*;

#[derive(Debug, PartialEq)]
pub struct Subscribe {
    pub user_agent: String,
    pub extranonce1: Option<Extranonce>,
}

impl Serialize for Subscribe {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let len = if self.extranonce1.is_some() { 2 } else { 1 };
        let mut seq = serializer.serialize_seq(Some(len))?;
        seq.serialize_element(&self.user_agent)?;
        if let Some(extranonce1) = &self.extranonce1 {
            seq.serialize_element(extranonce1)?;
        }
        seq.end()
    }
}

/// Result of `mining.subscribe`: `[subscriptions, extranonce1, extranonce2_size]`.
/// Pools disagree on the shape of the subscription list, so it is kept as
/// raw JSON.
#[derive(Debug, PartialEq, Clone)]
pub struct SubscribeResult {
    pub subscriptions: Value,
    pub extranonce1: Extranonce,
    pub extranonce2_size: usize,
}

impl Serialize for SubscribeResult {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(3))?;
        seq.serialize_element(&self.subscriptions)?;
        seq.serialize_element(&self.extranonce1)?;
        seq.serialize_element(&self.extranonce2_size)?;
        seq.end()
    }
}

impl<'de> Deserialize<'de> for SubscribeResult {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let (subscriptions, extranonce1, extranonce2_size) =
            <(Value, Extranonce, usize)>::deserialize(deserializer)?;

        if extranonce2_size > 32 {
            return Err(de::Error::custom(format!(
                "extranonce2_size {extranonce2_size} exceeds 32 bytes"
            )));
        }

        Ok(SubscribeResult {
            subscriptions,
            extranonce1,
            extranonce2_size,
        })
    }
}
