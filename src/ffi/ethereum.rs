use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    /// the provider injected by the browser extension (e.g. MetaMask)
    #[wasm_bindgen(thread_local_v2, js_namespace = ["window"], js_name = "ethereum")]
    pub static ETHEREUM: Option<EthereumProvider>;
}

#[wasm_bindgen]
extern "C" {
    #[derive(Clone, PartialEq)]
    pub type EthereumProvider;

    /// Subscribe `listener` to the provider's `event`. The listener is
    /// called with the event's arguments.
    #[wasm_bindgen(method, js_name = "on")]
    pub fn on(this: &EthereumProvider, event: &str, listener: &js_sys::Function);

    /// Remove a listener previously registered with [`on`]. The same
    /// function object must be given.
    ///
    /// [`on`]: EthereumProvider::on
    #[wasm_bindgen(method, js_name = "removeListener")]
    pub fn remove_listener(this: &EthereumProvider, event: &str, listener: &js_sys::Function);
}
