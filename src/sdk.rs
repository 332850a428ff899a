use crate::{
    error::ProviderError,
    rpc::{RequestArguments, method},
};
use serde_json::Value;
use std::rc::Rc;

/// Configuration of the wallet SDK.
///
/// The connector does not look into it: the value is handed verbatim to
/// the SDK. Defaults to the empty object `{}`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct InitOptions(Value);

impl InitOptions {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

impl Default for InitOptions {
    fn default() -> Self {
        Self(Value::Object(serde_json::Map::new()))
    }
}

impl From<Value> for InitOptions {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// Events published by an injected browser provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ProviderEvent {
    ChainChanged,
    AccountsChanged,
    Close,
    /// legacy counterpart of [`ProviderEvent::ChainChanged`]
    NetworkChanged,
}

impl ProviderEvent {
    pub const ALL: [Self; 4] = [
        Self::ChainChanged,
        Self::AccountsChanged,
        Self::Close,
        Self::NetworkChanged,
    ];

    /// name of the event on the JavaScript side
    pub const fn name(self) -> &'static str {
        match self {
            Self::ChainChanged => "chainChanged",
            Self::AccountsChanged => "accountsChanged",
            Self::Close => "close",
            Self::NetworkChanged => "networkChanged",
        }
    }
}

/// Callback receiving the (first) argument of a provider event.
///
/// The identity of the `Rc` is what [`InjectedTransport::remove_listener`]
/// matches on.
pub type EventHandler = Rc<dyn Fn(Value)>;

/// `true` if both handles point to the same handler.
pub fn same_handler(left: &EventHandler, right: &EventHandler) -> bool {
    std::ptr::addr_eq(Rc::as_ptr(left), Rc::as_ptr(right))
}

/// Browser extension transport (e.g. `window.ethereum`) exposing event
/// subscriptions.
pub trait InjectedTransport {
    fn on(&self, event: ProviderEvent, handler: &EventHandler);

    fn remove_listener(&self, event: ProviderEvent, handler: &EventHandler);
}

/// Client of a third party wallet SDK.
///
/// The futures are not `Send`: everything runs on the browser's event loop.
#[allow(async_fn_in_trait)]
pub trait WalletSdk {
    type Transport: InjectedTransport + 'static;

    /// start the SDK, called before any other method
    async fn init(&self, options: &InitOptions) -> Result<(), ProviderError>;

    async fn request(&self, args: RequestArguments) -> Result<Value, ProviderError>;

    /// Request the user to grant access to their accounts.
    ///
    /// Returns the (possibly enveloped) list of accounts.
    async fn enable(&self) -> Result<Value, ProviderError> {
        self.request(RequestArguments::new(method::ETH_REQUEST_ACCOUNTS))
            .await
    }

    fn close(&self);

    /// `false` once the SDK needs [`WalletSdk::init`] to be called again,
    /// e.g. after it was closed.
    fn is_initialized(&self) -> bool {
        true
    }

    /// The injected transport the SDK runs over, if any. The connector
    /// subscribes to its events on activation.
    fn injected_transport(&self) -> Option<Rc<Self::Transport>>;

    /// called once the connector stopped listening to the injected transport
    fn release_injected_transport(&self) {}
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn init_options_are_opaque() {
        assert_eq!(InitOptions::default().as_value(), &json!({}));

        let options: InitOptions = serde_json::from_value(json!({
            "apiKey": "k",
            "network": { "chainId": 137 },
        }))
        .unwrap();
        assert_eq!(
            serde_json::to_value(&options).unwrap(),
            json!({ "apiKey": "k", "network": { "chainId": 137 } })
        );
    }

    #[test]
    fn event_names() {
        let names: Vec<_> = ProviderEvent::ALL.iter().map(|e| e.name()).collect();
        assert_eq!(
            names,
            ["chainChanged", "accountsChanged", "close", "networkChanged"]
        );
    }
}
