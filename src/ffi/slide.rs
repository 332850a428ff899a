use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    #[derive(Clone, PartialEq)]
    #[wasm_bindgen(js_namespace = ["window"], js_name = "SlideSdk")]
    pub type SlideSdk;

    /// Create the SDK with its configuration, nothing is loaded until
    /// [`init`] is called.
    ///
    /// [`init`]: SlideSdk::init
    #[wasm_bindgen(constructor, js_namespace = ["window"], js_class = "SlideSdk")]
    pub fn new(options: &JsValue) -> SlideSdk;

    #[wasm_bindgen(method, catch, js_name = "init")]
    pub async fn init(this: &SlideSdk) -> Result<JsValue, JsValue>;

    /// EIP-1193 request: `{ method, params }`
    #[wasm_bindgen(method, catch, js_name = "request")]
    pub async fn request(this: &SlideSdk, args: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(method, js_name = "close")]
    pub fn close(this: &SlideSdk);

    /// `true` when the SDK forwards the requests to the injected
    /// `window.ethereum` provider rather than to its own wallet.
    #[wasm_bindgen(method, getter, js_name = "isUsingMetamask")]
    pub fn is_using_metamask(this: &SlideSdk) -> Option<bool>;

    #[wasm_bindgen(method, setter, js_name = "isUsingMetamask")]
    pub fn set_is_using_metamask(this: &SlideSdk, value: bool);
}
