use wasm_bindgen::JsValue;

/// EIP-1193 code a provider returns when the user declined the request.
pub const USER_REJECTED_REQUEST: i64 = 4001;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, thiserror::Error)]
pub enum ProviderErrorCode {
    #[error("The user rejected the request.")]
    UserRejectedRequest,
    #[error("The requested method and/or account has not been authorized by the user.")]
    Unauthorized,
    #[error("The provider does not support the requested method.")]
    UnsupportedMethod,
    /// The wallet will need to be activated again.
    #[error("The provider is disconnected from all chains.")]
    Disconnected,
    #[error("The provider is not connected to the requested chain.")]
    ChainDisconnected,
    #[error("Unknown error code `{0}'")]
    Unknown(i64),
}

impl From<i64> for ProviderErrorCode {
    fn from(code: i64) -> Self {
        match code {
            USER_REJECTED_REQUEST => Self::UserRejectedRequest,
            4100 => Self::Unauthorized,
            4200 => Self::UnsupportedMethod,
            4900 => Self::Disconnected,
            4901 => Self::ChainDisconnected,
            unknown => Self::Unknown(unknown),
        }
    }
}

impl From<ProviderErrorCode> for i64 {
    fn from(code: ProviderErrorCode) -> Self {
        match code {
            ProviderErrorCode::UserRejectedRequest => USER_REJECTED_REQUEST,
            ProviderErrorCode::Unauthorized => 4100,
            ProviderErrorCode::UnsupportedMethod => 4200,
            ProviderErrorCode::Disconnected => 4900,
            ProviderErrorCode::ChainDisconnected => 4901,
            ProviderErrorCode::Unknown(code) => code,
        }
    }
}

/// Error raised by the wallet SDK or the injected provider.
///
/// Errors thrown from JavaScript do not always carry a `code`, hence
/// the optional field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, thiserror::Error, serde::Deserialize)]
#[error("{message} ({})", describe_code(.code))]
pub struct ProviderError {
    #[serde(default)]
    pub code: Option<ProviderErrorCode>,
    #[serde(default)]
    pub message: String,
}

fn describe_code(code: &Option<ProviderErrorCode>) -> String {
    match code {
        Some(code) => format!("code {}", i64::from(*code)),
        None => "no code".to_owned(),
    }
}

impl ProviderError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code: Some(ProviderErrorCode::from(code)),
            message: message.into(),
        }
    }

    /// error without code, raised on our side of the SDK
    pub fn other(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    pub fn is_user_rejection(&self) -> bool {
        self.code == Some(ProviderErrorCode::UserRejectedRequest)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConnectorError {
    #[error("The user rejected the request.")]
    UserRejectedRequest,
    #[error("The wallet SDK failed to initialize: {0}")]
    Initialization(#[source] ProviderError),
    #[error("The wallet SDK is not initialized, activate the connector first")]
    NotInitialized,
    #[error(transparent)]
    Provider(ProviderError),
}

impl From<ProviderError> for ConnectorError {
    fn from(error: ProviderError) -> Self {
        if error.is_user_rejection() {
            Self::UserRejectedRequest
        } else {
            Self::Provider(error)
        }
    }
}

/// Decode the error thrown by the JavaScript side. The `code` and `message`
/// properties are read if present, anything else is kept as its debug
/// representation.
impl From<JsValue> for ProviderError {
    fn from(error: JsValue) -> Self {
        let property = |name: &str| js_sys::Reflect::get(&error, &JsValue::from_str(name)).ok();

        let code = property("code")
            .and_then(|code| code.as_f64())
            .map(|code| ProviderErrorCode::from(code as i64));
        let message = property("message")
            .and_then(|message| message.as_string())
            .or_else(|| error.as_string())
            .unwrap_or_else(|| format!("{error:?}"));

        Self { code, message }
    }
}

impl<'de> serde::Deserialize<'de> for ProviderErrorCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct Visitor;
        impl serde::de::Visitor<'_> for Visitor {
            type Value = ProviderErrorCode;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(formatter, "Expecting an integer ProviderErrorCode")
            }

            fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(ProviderErrorCode::from(v))
            }

            fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                i64::try_from(v)
                    .map(ProviderErrorCode::from)
                    .map_err(|_| E::custom(format!("error code `{v}' is out of range")))
            }
        }

        deserializer.deserialize_i64(Visitor)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn provider_error_code_json() {
        assert_eq!(
            serde_json::from_value::<ProviderErrorCode>(json! { 4001 }).unwrap(),
            ProviderErrorCode::UserRejectedRequest
        );
        assert_eq!(
            serde_json::from_value::<ProviderErrorCode>(json! { 4100 }).unwrap(),
            ProviderErrorCode::Unauthorized
        );
        assert_eq!(
            serde_json::from_value::<ProviderErrorCode>(json! { 4200 }).unwrap(),
            ProviderErrorCode::UnsupportedMethod
        );
        assert_eq!(
            serde_json::from_value::<ProviderErrorCode>(json! { 4900 }).unwrap(),
            ProviderErrorCode::Disconnected
        );
        assert_eq!(
            serde_json::from_value::<ProviderErrorCode>(json! { 4901 }).unwrap(),
            ProviderErrorCode::ChainDisconnected
        );
        assert_eq!(
            serde_json::from_value::<ProviderErrorCode>(json! { -32603 }).unwrap(),
            ProviderErrorCode::Unknown(-32603)
        );
    }

    #[test]
    fn provider_error_json() {
        assert_eq!(
            serde_json::from_value::<ProviderError>(json! { {
                "code": 4001,
                "message": "User rejected the request.",
            }})
            .unwrap(),
            ProviderError {
                code: Some(ProviderErrorCode::UserRejectedRequest),
                message: "User rejected the request.".to_owned()
            }
        );

        assert_eq!(
            serde_json::from_value::<ProviderError>(json! { {
                "message": "Failed to fetch",
            }})
            .unwrap(),
            ProviderError {
                code: None,
                message: "Failed to fetch".to_owned()
            }
        );
    }

    #[test]
    fn rejection_becomes_dedicated_error() {
        let rejected = ProviderError::new(USER_REJECTED_REQUEST, "denied");
        assert!(rejected.is_user_rejection());
        assert_eq!(
            ConnectorError::from(rejected),
            ConnectorError::UserRejectedRequest
        );

        let failure = ProviderError::new(4900, "disconnected");
        assert_eq!(
            ConnectorError::from(failure.clone()),
            ConnectorError::Provider(failure)
        );
    }

    #[test]
    fn provider_error_display() {
        assert_eq!(
            ProviderError::new(4200, "eth_foo is not supported").to_string(),
            "eth_foo is not supported (code 4200)"
        );
        assert_eq!(ProviderError::other("boom").to_string(), "boom (no code)");
    }
}
