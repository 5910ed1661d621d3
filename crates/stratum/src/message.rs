use super::*;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, Display, Clone)]
#[serde(untagged)]
pub enum Id {
    Null,
    Number(u64),
    String(String),
}

/// One line of stratum traffic, classified once when it is parsed.
#[derive(Debug, Serialize, PartialEq)]
#[serde(untagged)]
pub enum Message {
    Request {
        id: Id,
        method: String,
        params: Value,
    },
    Response {
        id: Id,
        result: Option<Value>,
        error: Option<JsonRpcError>,
        #[serde(skip_serializing_if = "Option::is_none", rename = "reject-reason")]
        reject_reason: Option<String>,
    },
    Notification {
        method: String,
        params: Value,
    },
}

impl Message {
    pub fn request(id: u64, method: &str, params: Value) -> Self {
        Message::Request {
            id: Id::Number(id),
            method: method.into(),
            params,
        }
    }
}

/// Pools send notifications with `"id": null` as well as with no id at all;
/// both are accepted. A method with a non-null id is a server-initiated
/// request, which a miner can ignore.
impl<'de> Deserialize<'de> for Message {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;

        let has_method = value.get("method").is_some();

        let is_response = !has_method
            && (value.get("result").is_some()
                || value.get("error").is_some()
                || value.get("reject-reason").is_some());

        let is_notification =
            has_method && matches!(value.get("id"), None | Some(Value::Null));

        if is_response {
            #[derive(Deserialize)]
            struct Resp {
                id: Id,
                result: Option<Value>,
                error: Option<JsonRpcError>,
                #[serde(rename = "reject-reason")]
                reject_reason: Option<String>,
            }

            let r: Resp = serde_json::from_value(value).map_err(de::Error::custom)?;

            Ok(Message::Response {
                id: r.id,
                result: r.result,
                error: r.error,
                reject_reason: r.reject_reason,
            })
        } else if is_notification {
            let method = value
                .get("method")
                .and_then(Value::as_str)
                .ok_or_else(|| de::Error::missing_field("method"))?
                .to_string();

            let params = value.get("params").cloned().unwrap_or(Value::Null);

            Ok(Message::Notification { method, params })
        } else if has_method {
            #[derive(Deserialize)]
            struct Req {
                id: Id,
                method: String,
                #[serde(default)]
                params: Value,
            }

            let r: Req = serde_json::from_value(value).map_err(de::Error::custom)?;

            Ok(Message::Request {
                id: r.id,
                method: r.method,
                params: r.params,
            })
        } else {
            Err(de::Error::custom("unknown message format"))
        }
    }
}

#[cfg(test)]
mod tests {
    use {super::*, pretty_assertions::assert_eq, serde_json::json};

    #[track_caller]
    fn case(s: &str, expected: Message) {
        let actual = serde_json::from_str::<Message>(s).unwrap();
        assert_eq!(actual, expected, "deserialize Message from str");

        let serialized = serde_json::to_string(&actual).unwrap();
        let lhs: Value = serde_json::from_str(s).unwrap();
        let rhs: Value = serde_json::from_str(&serialized).unwrap();
        assert_eq!(lhs, rhs, "JSON semantic equality");
    }

    #[test]
    fn request() {
        case(
            r#"{"id":1,"method":"mining.subscribe","params":[]}"#,
            Message::Request {
                id: Id::Number(1),
                method: "mining.subscribe".into(),
                params: json!([]),
            },
        );

        assert_eq!(
            Message::request(1, "mining.subscribe", json!([])),
            serde_json::from_str(r#"{"id":1,"method":"mining.subscribe","params":[]}"#).unwrap()
        );
    }

    #[test]
    fn notification() {
        case(
            r#"{"method":"mining.set_difficulty","params":[2]}"#,
            Message::Notification {
                method: "mining.set_difficulty".into(),
                params: json!([2]),
            },
        );

        assert_eq!(
            serde_json::from_str::<Message>(r#"{"method":"mining.notify","params":[],"id":null}"#)
                .unwrap(),
            Message::Notification {
                method: "mining.notify".into(),
                params: json!([]),
            }
        );
    }

    #[test]
    fn response() {
        case(
            r#"{"id":8,"result":[[["mining.set_difficulty","b4b6693b72a50c7116db18d6497cac52"],["mining.notify","ae6812eb4cd7735a302a8a9dd95cf71f"]],"08000002",4],"error":null}"#,
            Message::Response {
                id: Id::Number(8),
                result: Some(json!([
                    [
                        ["mining.set_difficulty", "b4b6693b72a50c7116db18d6497cac52"],
                        ["mining.notify", "ae6812eb4cd7735a302a8a9dd95cf71f"]
                    ],
                    "08000002",
                    4
                ])),
                error: None,
                reject_reason: None,
            },
        );
    }

    #[test]
    fn rejected_share_response() {
        assert_eq!(
            serde_json::from_str::<Message>(
                r#"{"reject-reason":"Above target","result":false,"error":null,"id":5}"#
            )
            .unwrap(),
            Message::Response {
                id: Id::Number(5),
                result: Some(json!(false)),
                error: None,
                reject_reason: Some("Above target".into()),
            },
        );
    }

    #[test]
    fn error_response() {
        case(
            r#"{"id":10,"result":null,"error":[21,"Job not found",null]}"#,
            Message::Response {
                id: Id::Number(10),
                result: None,
                reject_reason: None,
                error: Some(JsonRpcError {
                    error_code: 21,
                    message: "Job not found".into(),
                    traceback: None,
                }),
            },
        );
    }

    #[test]
    fn string_id() {
        assert_eq!(
            serde_json::from_str::<Message>(r#"{"id":"a1","result":true,"error":null}"#).unwrap(),
            Message::Response {
                id: Id::String("a1".into()),
                result: Some(json!(true)),
                error: None,
                reject_reason: None,
            }
        );
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(serde_json::from_str::<Message>(r#"{"foo":1}"#).is_err());
        assert!(serde_json::from_str::<Message>("[1,2,3]").is_err());
        assert!(serde_json::from_str::<Message>("not json").is_err());
    }
}
