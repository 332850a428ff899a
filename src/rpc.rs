/*!
Provider request convention (EIP-1193) and the shapes of its responses.

Providers answer either with the raw value or with a JSON-RPC envelope
carrying the value under `result`. [`parse_send_return`] is applied to
every response before looking at it.
*/

use core::fmt;
use serde_json::Value;

pub mod method {
    pub const ETH_REQUEST_ACCOUNTS: &str = "eth_requestAccounts";
    pub const ETH_ACCOUNTS: &str = "eth_accounts";
    pub const ETH_CHAIN_ID: &str = "eth_chainId";
    pub const NET_VERSION: &str = "net_version";
}

const ENVELOPE_FIELD: &str = "result";

/// Polygon mainnet, the chain both the Slide and the Intry SDKs operate on.
pub const POLYGON_MAINNET: u64 = 137;

/// argument of the provider's `request` call
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct RequestArguments {
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl RequestArguments {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            params: None,
        }
    }

    #[must_use]
    pub fn with_params(mut self, params: Value) -> Self {
        self.params = Some(params);
        self
    }
}

/// Unwrap the response envelope if there is one, otherwise returns the
/// value unchanged.
pub fn parse_send_return(value: Value) -> Value {
    match value {
        Value::Object(mut object) => match object.remove(ENVELOPE_FIELD) {
            Some(result) => result,
            None => Value::Object(object),
        },
        raw => raw,
    }
}

/// Same as [`parse_send_return`] but keeps unwrapping until the value is
/// no longer enveloped. Some providers forward the full JSON-RPC response
/// of the node inside their own envelope.
pub fn unwrap_envelopes(mut value: Value) -> Value {
    while is_envelope(&value) {
        value = parse_send_return(value);
    }
    value
}

fn is_envelope(value: &Value) -> bool {
    value
        .as_object()
        .is_some_and(|object| object.contains_key(ENVELOPE_FIELD))
}

/// List the addresses of an `eth_accounts` like response, as returned.
///
/// Non string entries are skipped, anything that is not an array yields
/// an empty list.
pub fn accounts(value: &Value) -> Vec<String> {
    value
        .as_array()
        .map(|accounts| {
            accounts
                .iter()
                .filter_map(Value::as_str)
                .map(ToOwned::to_owned)
                .collect()
        })
        .unwrap_or_default()
}

/// The primary account of an `eth_accounts` like response, `None` if it
/// is missing or blank.
pub fn first_account(value: &Value) -> Option<String> {
    accounts(value)
        .into_iter()
        .next()
        .filter(|account| !account.is_empty())
}

/// Chain identifier as reported by the provider.
///
/// `eth_chainId` answers with an hexadecimal string (`"0x89"`), `net_version`
/// with a decimal string (`"137"`) and the provider events may use plain
/// numbers. The value is kept as received, [`ChainId::as_u64`] interprets it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum ChainId {
    Number(u64),
    Text(String),
}

impl ChainId {
    /// Read the chain id out of a (normalized) response.
    ///
    /// Returns `None` for empty values: `0`, `""`, `null` or anything
    /// that is neither a number nor a string.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(number) => number.as_u64().filter(|n| *n != 0).map(Self::Number),
            Value::String(text) if !text.trim().is_empty() => Some(Self::Text(text.clone())),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Number(number) => Some(*number),
            Self::Text(text) => {
                let text = text.trim();
                match text
                    .strip_prefix("0x")
                    .or_else(|| text.strip_prefix("0X"))
                {
                    Some(hex) => u64::from_str_radix(hex, 16).ok(),
                    None => text.parse().ok(),
                }
            }
        }
    }
}

impl From<u64> for ChainId {
    fn from(number: u64) -> Self {
        Self::Number(number)
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(number) => write!(f, "{number}"),
            Self::Text(text) => write!(f, "{text}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn raw_values_pass_through() {
        assert_eq!(parse_send_return(json!("0x89")), json!("0x89"));
        assert_eq!(parse_send_return(json!(["0xabc"])), json!(["0xabc"]));
        assert_eq!(
            parse_send_return(json!({ "chainId": "0x89" })),
            json!({ "chainId": "0x89" })
        );
        assert_eq!(parse_send_return(Value::Null), Value::Null);
    }

    #[test]
    fn envelope_is_unwrapped_once() {
        assert_eq!(
            parse_send_return(json!({ "jsonrpc": "2.0", "id": 1, "result": ["0xabc"] })),
            json!(["0xabc"])
        );
        assert_eq!(
            parse_send_return(json!({ "result": { "result": "137" } })),
            json!({ "result": "137" })
        );
        assert_eq!(parse_send_return(json!({ "result": null })), Value::Null);
    }

    #[test]
    fn nested_envelopes_are_unwrapped() {
        assert_eq!(
            unwrap_envelopes(json!({ "result": { "id": 4, "result": "137" } })),
            json!("137")
        );
        assert_eq!(unwrap_envelopes(json!("137")), json!("137"));
    }

    #[test]
    fn request_arguments_json() {
        assert_eq!(
            serde_json::to_value(RequestArguments::new(method::ETH_CHAIN_ID)).unwrap(),
            json!({ "method": "eth_chainId" })
        );
        assert_eq!(
            serde_json::to_value(
                RequestArguments::new("wallet_switchEthereumChain")
                    .with_params(json!([{ "chainId": "0x89" }]))
            )
            .unwrap(),
            json!({ "method": "wallet_switchEthereumChain", "params": [{ "chainId": "0x89" }] })
        );
    }

    #[test]
    fn accounts_of_response() {
        assert_eq!(
            accounts(&json!(["0xabc", "0xdef"])),
            vec!["0xabc".to_owned(), "0xdef".to_owned()]
        );
        assert_eq!(first_account(&json!(["0xabc", "0xdef"])), Some("0xabc".to_owned()));
        assert_eq!(first_account(&json!([])), None);
        assert_eq!(first_account(&json!([""])), None);
        assert_eq!(first_account(&json!(["", "0x1"])), None);
        assert_eq!(
            accounts(&json!(["", "0x1", 42])),
            vec![String::new(), "0x1".to_owned()]
        );
        assert_eq!(first_account(&json!("0xabc")), None);
        assert!(accounts(&Value::Null).is_empty());
    }

    #[test]
    fn chain_id_from_value() {
        assert_eq!(
            ChainId::from_value(&json!("0x89")),
            Some(ChainId::Text("0x89".to_owned()))
        );
        assert_eq!(ChainId::from_value(&json!(137)), Some(ChainId::Number(137)));
        assert_eq!(ChainId::from_value(&json!(0)), None);
        assert_eq!(ChainId::from_value(&json!("")), None);
        assert_eq!(ChainId::from_value(&json!(null)), None);
        assert_eq!(ChainId::from_value(&json!({ "result": "137" })), None);
    }

    #[test]
    fn chain_id_as_number() {
        assert_eq!(ChainId::Text("0x89".to_owned()).as_u64(), Some(POLYGON_MAINNET));
        assert_eq!(ChainId::Text("137".to_owned()).as_u64(), Some(POLYGON_MAINNET));
        assert_eq!(ChainId::Number(80002).as_u64(), Some(80002));
        assert_eq!(ChainId::Text("polygon".to_owned()).as_u64(), None);
        assert_eq!(ChainId::Text("0x89".to_owned()).to_string(), "0x89");
    }
}
