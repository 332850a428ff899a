use crate::{
    ffi,
    sdk::{EventHandler, InjectedTransport, ProviderEvent, same_handler},
};
use serde_json::Value;
use std::cell::RefCell;
use wasm_bindgen::{JsCast, JsValue, closure::Closure};

struct Listener {
    event: ProviderEvent,
    handler: EventHandler,
    closure: Closure<dyn Fn(JsValue)>,
}

/// The `window.ethereum` provider, as injected by the browser extension.
///
/// Every subscribed [`EventHandler`] is wrapped into a JavaScript closure
/// kept alive until the handler is removed.
pub struct InjectedEthereum {
    provider: ffi::EthereumProvider,
    listeners: RefCell<Vec<Listener>>,
}

impl InjectedEthereum {
    pub fn new(provider: ffi::EthereumProvider) -> Self {
        Self {
            provider,
            listeners: RefCell::new(Vec::new()),
        }
    }

    /// Look for `window.ethereum`. Providers which do not support event
    /// subscriptions are ignored.
    pub fn detect() -> Option<Self> {
        ffi::ethereum::ETHEREUM
            .with(|provider| provider.clone())
            .filter(supports_listeners)
            .map(Self::new)
    }

    pub fn provider(&self) -> &ffi::EthereumProvider {
        &self.provider
    }
}

fn supports_listeners(provider: &ffi::EthereumProvider) -> bool {
    let has_function_property = |prop: &str| {
        js_sys::Reflect::get(provider, &JsValue::from_str(prop))
            .ok()
            .is_some_and(|v| v.is_function())
    };

    has_function_property("on") && has_function_property("removeListener")
}

impl InjectedTransport for InjectedEthereum {
    fn on(&self, event: ProviderEvent, handler: &EventHandler) {
        let callback = EventHandler::clone(handler);
        let closure = Closure::<dyn Fn(JsValue)>::new(move |payload: JsValue| {
            match serde_wasm_bindgen::from_value::<Value>(payload) {
                Ok(payload) => callback(payload),
                Err(error) => {
                    tracing::warn!(event = event.name(), %error, "couldn't decode the event payload");
                }
            }
        });

        self.provider
            .on(event.name(), closure.as_ref().unchecked_ref());
        self.listeners.borrow_mut().push(Listener {
            event,
            handler: EventHandler::clone(handler),
            closure,
        });
    }

    fn remove_listener(&self, event: ProviderEvent, handler: &EventHandler) {
        self.listeners.borrow_mut().retain(|listener| {
            let matching = listener.event == event && same_handler(&listener.handler, handler);
            if matching {
                self.provider
                    .remove_listener(event.name(), listener.closure.as_ref().unchecked_ref());
            }
            !matching
        });
    }
}
