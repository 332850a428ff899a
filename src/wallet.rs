use crate::{
    connector::Connector,
    error::ProviderError,
    ffi,
    injected::InjectedEthereum,
    rpc::RequestArguments,
    sdk::{InitOptions, WalletSdk},
};
use serde::Serialize;
use serde_json::Value;
use std::rc::Rc;
use wasm_bindgen::JsValue;

pub type SlideConnector = Connector<SlideClient, fn(&InitOptions) -> SlideClient>;
pub type IntryConnector = Connector<IntryClient, fn(&InitOptions) -> IntryClient>;

/// Connector over the Slide SDK (`window.SlideSdk`).
///
/// The SDK is created on the first activation. When the user chose to go
/// through their browser extension the connector also follows the events
/// of `window.ethereum`.
pub fn slide_connector(options: InitOptions) -> SlideConnector {
    Connector::new(
        options,
        SlideClient::new as fn(&InitOptions) -> SlideClient,
    )
}

/// Connector over the Intry SDK (`window.IntrySdk`).
pub fn intry_connector(options: InitOptions) -> IntryConnector {
    Connector::new(
        options,
        IntryClient::new as fn(&InitOptions) -> IntryClient,
    )
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, ProviderError> {
    // objects must reach the SDK as plain objects, not as `Map`s
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|error| ProviderError::other(format!("Couldn't encode the value: {error}")))
}

fn from_js(value: JsValue) -> Result<Value, ProviderError> {
    serde_wasm_bindgen::from_value(value)
        .map_err(|error| ProviderError::other(format!("Couldn't decode the response: {error}")))
}

pub struct SlideClient {
    /// options that could not be encoded are reported on `init`
    sdk: Result<ffi::SlideSdk, ProviderError>,
}

impl SlideClient {
    pub fn new(options: &InitOptions) -> Self {
        Self {
            sdk: to_js(options).map(|options| ffi::SlideSdk::new(&options)),
        }
    }

    fn sdk(&self) -> Result<&ffi::SlideSdk, ProviderError> {
        self.sdk.as_ref().map_err(Clone::clone)
    }
}

impl WalletSdk for SlideClient {
    type Transport = InjectedEthereum;

    async fn init(&self, _options: &InitOptions) -> Result<(), ProviderError> {
        self.sdk()?
            .init()
            .await
            .map(drop)
            .map_err(ProviderError::from)
    }

    async fn request(&self, args: RequestArguments) -> Result<Value, ProviderError> {
        let response = self
            .sdk()?
            .request(to_js(&args)?)
            .await
            .map_err(ProviderError::from)?;
        from_js(response)
    }

    fn close(&self) {
        if let Ok(sdk) = &self.sdk {
            sdk.close();
        }
    }

    fn injected_transport(&self) -> Option<Rc<InjectedEthereum>> {
        if self.sdk.as_ref().ok()?.is_using_metamask() != Some(true) {
            return None;
        }

        InjectedEthereum::detect().map(Rc::new)
    }

    fn release_injected_transport(&self) {
        if let Ok(sdk) = &self.sdk {
            sdk.set_is_using_metamask(false);
        }
    }
}

pub struct IntryClient {
    sdk: ffi::IntrySdk,
}

impl IntryClient {
    /// The Intry SDK receives its options on [`WalletSdk::init`].
    pub fn new(_options: &InitOptions) -> Self {
        Self {
            sdk: ffi::IntrySdk::new(),
        }
    }
}

impl WalletSdk for IntryClient {
    type Transport = InjectedEthereum;

    async fn init(&self, options: &InitOptions) -> Result<(), ProviderError> {
        self.sdk
            .init(to_js(options)?)
            .await
            .map(drop)
            .map_err(ProviderError::from)
    }

    async fn request(&self, args: RequestArguments) -> Result<Value, ProviderError> {
        let response = self
            .sdk
            .request(to_js(&args)?)
            .await
            .map_err(ProviderError::from)?;
        from_js(response)
    }

    /// The SDK drops its session when closed, the connector then starts it
    /// again on the next activation.
    fn is_initialized(&self) -> bool {
        self.sdk.initialized() == Some(true)
    }

    async fn enable(&self) -> Result<Value, ProviderError> {
        let accounts = self.sdk.enable().await.map_err(ProviderError::from)?;
        from_js(accounts)
    }

    fn close(&self) {
        self.sdk.close();
    }

    /// The Intry SDK always talks to its own wallet.
    fn injected_transport(&self) -> Option<Rc<InjectedEthereum>> {
        None
    }
}
