use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    #[derive(Clone, PartialEq)]
    #[wasm_bindgen(js_namespace = ["window"], js_name = "IntrySdk")]
    pub type IntrySdk;

    #[wasm_bindgen(constructor, js_namespace = ["window"], js_class = "IntrySdk")]
    pub fn new() -> IntrySdk;

    /// set once [`init`] succeeded
    ///
    /// [`init`]: IntrySdk::init
    #[wasm_bindgen(method, getter, js_name = "initialized")]
    pub fn initialized(this: &IntrySdk) -> Option<bool>;

    #[wasm_bindgen(method, catch, js_name = "init")]
    pub async fn init(this: &IntrySdk, options: JsValue) -> Result<JsValue, JsValue>;

    /// Prompts the user to connect, resolves to the list of accounts.
    #[wasm_bindgen(method, catch, js_name = "enable")]
    pub async fn enable(this: &IntrySdk) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(method, catch, js_name = "request")]
    pub async fn request(this: &IntrySdk, args: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(method, js_name = "close")]
    pub fn close(this: &IntrySdk);
}
