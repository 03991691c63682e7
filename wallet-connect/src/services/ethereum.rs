//! Injected Ethereum provider (EIP-1193) via wasm-bindgen
//!
//! The store treats the provider as an optional capability: whatever sits at
//! `window.ethereum` is wrapped in [`InjectedProvider`] and handed around as an
//! `Rc<dyn EthereumProvider>`. Tests substitute their own implementation.

use std::cell::RefCell;
use std::rc::Rc;

use async_trait::async_trait;
use js_sys::Reflect;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

/// EIP-1193 code for "User rejected the request."
pub const USER_REJECTED_REQUEST: i64 = 4001;

/// JSON-RPC methods the store issues
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequestMethod {
    /// Prompts the user to authorize the site.
    RequestAccounts,
    /// Lists already-authorized accounts without prompting.
    Accounts,
}

impl RequestMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestMethod::RequestAccounts => "eth_requestAccounts",
            RequestMethod::Accounts => "eth_accounts",
        }
    }
}

/// Provider events the store listens to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProviderEvent {
    AccountsChanged,
}

impl ProviderEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderEvent::AccountsChanged => "accountsChanged",
        }
    }
}

/// Rejection payload of a provider request
///
/// `code` keeps whatever the provider put under the `code` key, numeric or
/// not; `None` means the rejection had no such key at all (a plain `Error`,
/// a string, ...).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderError {
    pub code: Option<Value>,
    pub message: Option<String>,
}

impl ProviderError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code: Some(Value::from(code)),
            message: Some(message.into()),
        }
    }

    /// Failure that carries no code, e.g. a malformed response
    pub fn uncoded(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: Some(message.into()),
        }
    }

    pub fn user_rejected() -> Self {
        Self::new(USER_REJECTED_REQUEST, "User rejected the request.")
    }

    /// Exactly 4001; `4001.5` or `"4001"` do not count
    pub fn is_user_rejection(&self) -> bool {
        self.code.as_ref().and_then(Value::as_f64) == Some(USER_REJECTED_REQUEST as f64)
    }

    /// Interpret a rejection value
    ///
    /// Objects contribute their `code` key (any type) and a string `message`;
    /// a bare string becomes the message of an uncoded failure.
    pub fn from_rejection(value: &Value) -> Self {
        match value {
            Value::Object(fields) => Self {
                code: fields.get("code").cloned(),
                message: fields
                    .get("message")
                    .and_then(Value::as_str)
                    .map(str::to_string),
            },
            Value::String(message) => Self::uncoded(message.clone()),
            _ => Self::default(),
        }
    }

    /// Read `code` and `message` off whatever the provider rejected with
    ///
    /// `Error.message` is not enumerable, so the fields are picked with
    /// `Reflect` instead of deserializing the whole object.
    pub fn from_js(value: &JsValue) -> Self {
        if !value.is_object() {
            return Self::from_rejection(&js_to_json(value));
        }

        let key = |name: &str| JsValue::from_str(name);
        let mut fields = serde_json::Map::new();
        if Reflect::has(value, &key("code")).unwrap_or(false) {
            let code = Reflect::get(value, &key("code")).unwrap_or(JsValue::NULL);
            fields.insert("code".to_string(), js_to_json(&code));
        }
        if let Some(message) = Reflect::get(value, &key("message"))
            .ok()
            .and_then(|v| v.as_string())
        {
            fields.insert("message".to_string(), Value::String(message));
        }

        Self::from_rejection(&Value::Object(fields))
    }
}

/// Decode a request result into an address list
///
/// `null` counts as "no accounts"; anything that is not a list of strings is
/// reported as a provider failure without a code.
pub fn accounts_from_response(value: Value) -> Result<Vec<String>, ProviderError> {
    if value.is_null() {
        return Ok(Vec::new());
    }
    serde_json::from_value(value)
        .map_err(|e| ProviderError::uncoded(format!("Unexpected provider response: {}", e)))
}

/// Decode an `accountsChanged` payload; anything unexpected means "no accounts"
pub fn accounts_from_event(value: Value) -> Vec<String> {
    accounts_from_response(value).unwrap_or_default()
}

/// `undefined` and values serde cannot represent map to `null`
fn js_to_json(value: &JsValue) -> Value {
    serde_wasm_bindgen::from_value(value.clone()).unwrap_or(Value::Null)
}

/// Callback for `accountsChanged`
///
/// Listener identity is the `Rc` allocation: pass the same handle to
/// [`EthereumProvider::remove_listener`] that was given to [`EthereumProvider::on`].
pub type AccountsHandler = Rc<dyn Fn(Vec<String>)>;

/// The slice of the EIP-1193 provider API the wallet store relies on
#[async_trait(?Send)]
pub trait EthereumProvider {
    /// Capability flag (`isMetaMask`)
    fn is_metamask(&self) -> bool;

    /// Issue a JSON-RPC request that resolves to a list of addresses
    async fn request(&self, method: RequestMethod) -> Result<Vec<String>, ProviderError>;

    /// Subscribe to a provider event. Providers without `on` ignore this.
    fn on(&self, _event: ProviderEvent, _handler: AccountsHandler) {}

    /// Unsubscribe a handler previously passed to [`EthereumProvider::on`]
    fn remove_listener(&self, _event: ProviderEvent, _handler: &AccountsHandler) {}
}

// ============================================================================
// WINDOW.ETHEREUM BINDINGS (JavaScript Interop)
// ============================================================================

#[wasm_bindgen(inline_js = "
export function injectedEthereum() {
    return window.ethereum || null;
}

export function isMetaMaskProvider(provider) {
    return !!(provider && provider.isMetaMask);
}

export async function requestEthereum(provider, method) {
    return await provider.request({ method: method });
}

export function addProviderListener(provider, event, handler) {
    if (provider && typeof provider.on === 'function') {
        provider.on(event, handler);
        return true;
    }
    return false;
}

export function removeProviderListener(provider, event, handler) {
    if (provider && typeof provider.removeListener === 'function') {
        provider.removeListener(event, handler);
        return true;
    }
    return false;
}
")]
extern "C" {
    /// `window.ethereum`, or `null` when no wallet injected one
    fn injectedEthereum() -> JsValue;

    fn isMetaMaskProvider(provider: &JsValue) -> bool;

    #[wasm_bindgen(catch)]
    async fn requestEthereum(provider: &JsValue, method: &str) -> Result<JsValue, JsValue>;

    fn addProviderListener(provider: &JsValue, event: &str, handler: &js_sys::Function) -> bool;

    fn removeProviderListener(provider: &JsValue, event: &str, handler: &js_sys::Function) -> bool;
}

struct RegisteredListener {
    event: ProviderEvent,
    handler: AccountsHandler,
    closure: Closure<dyn Fn(JsValue)>,
}

/// `window.ethereum` as seen from Rust
pub struct InjectedProvider {
    handle: JsValue,
    listeners: RefCell<Vec<RegisteredListener>>,
}

impl InjectedProvider {
    /// Wrap the injected provider, if the page has one
    pub fn detect() -> Option<Self> {
        let handle = injectedEthereum();
        if handle.is_null() || handle.is_undefined() {
            return None;
        }
        Some(Self {
            handle,
            listeners: RefCell::new(Vec::new()),
        })
    }
}

#[async_trait(?Send)]
impl EthereumProvider for InjectedProvider {
    fn is_metamask(&self) -> bool {
        isMetaMaskProvider(&self.handle)
    }

    async fn request(&self, method: RequestMethod) -> Result<Vec<String>, ProviderError> {
        match requestEthereum(&self.handle, method.as_str()).await {
            Ok(value) => accounts_from_response(js_to_json(&value)),
            Err(e) => Err(ProviderError::from_js(&e)),
        }
    }

    fn on(&self, event: ProviderEvent, handler: AccountsHandler) {
        let callback = handler.clone();
        let closure = Closure::<dyn Fn(JsValue)>::new(move |value: JsValue| {
            callback(accounts_from_event(js_to_json(&value)));
        });

        if addProviderListener(&self.handle, event.as_str(), closure.as_ref().unchecked_ref()) {
            self.listeners.borrow_mut().push(RegisteredListener {
                event,
                handler,
                closure,
            });
        } else {
            log::warn!("Provider does not support '{}' subscriptions", event.as_str());
        }
    }

    fn remove_listener(&self, event: ProviderEvent, handler: &AccountsHandler) {
        let mut listeners = self.listeners.borrow_mut();
        let Some(index) = listeners
            .iter()
            .position(|l| l.event == event && Rc::ptr_eq(&l.handler, handler))
        else {
            return;
        };

        let listener = listeners.remove(index);
        removeProviderListener(
            &self.handle,
            event.as_str(),
            listener.closure.as_ref().unchecked_ref(),
        );
    }
}

/// Look up the injected provider as a nullable capability
pub fn detect_injected_provider() -> Option<Rc<dyn EthereumProvider>> {
    InjectedProvider::detect().map(|p| Rc::new(p) as Rc<dyn EthereumProvider>)
}

#[cfg(test)]
pub(crate) mod mock {
    //! In-memory provider for store tests

    use super::*;
    use futures::channel::oneshot;
    use std::collections::VecDeque;

    type Reply = Result<Vec<String>, ProviderError>;

    enum Scripted {
        Ready(Reply),
        Pending(oneshot::Receiver<Reply>),
    }

    #[derive(Default)]
    pub struct MockProvider {
        pub metamask: bool,
        pub calls: RefCell<Vec<String>>,
        replies: RefCell<Vec<(RequestMethod, VecDeque<Scripted>)>>,
        listeners: RefCell<Vec<AccountsHandler>>,
    }

    impl MockProvider {
        pub fn metamask() -> Rc<Self> {
            Rc::new(Self {
                metamask: true,
                ..Default::default()
            })
        }

        pub fn without_flag() -> Rc<Self> {
            Rc::new(Self::default())
        }

        fn push(&self, method: RequestMethod, reply: Scripted) {
            let mut replies = self.replies.borrow_mut();
            match replies.iter_mut().find(|(m, _)| *m == method) {
                Some((_, queue)) => queue.push_back(reply),
                None => replies.push((method, VecDeque::from([reply]))),
            }
        }

        /// Queue an immediate answer for `method`
        pub fn reply(&self, method: RequestMethod, reply: Reply) {
            self.push(method, Scripted::Ready(reply));
        }

        /// Queue an answer that arrives when the returned sender fires
        pub fn reply_later(&self, method: RequestMethod) -> oneshot::Sender<Reply> {
            let (tx, rx) = oneshot::channel();
            self.push(method, Scripted::Pending(rx));
            tx
        }

        pub fn listener_count(&self) -> usize {
            self.listeners.borrow().len()
        }

        /// Fire `accountsChanged` to every registered listener
        pub fn emit_accounts_changed(&self, accounts: &[&str]) {
            let listeners: Vec<AccountsHandler> = self.listeners.borrow().clone();
            for listener in listeners {
                listener(accounts.iter().map(|a| a.to_string()).collect());
            }
        }
    }

    #[async_trait(?Send)]
    impl EthereumProvider for MockProvider {
        fn is_metamask(&self) -> bool {
            self.metamask
        }

        async fn request(&self, method: RequestMethod) -> Result<Vec<String>, ProviderError> {
            self.calls.borrow_mut().push(method.as_str().to_string());
            let scripted = self
                .replies
                .borrow_mut()
                .iter_mut()
                .find(|(m, _)| *m == method)
                .and_then(|(_, queue)| queue.pop_front());

            match scripted {
                Some(Scripted::Ready(reply)) => reply,
                Some(Scripted::Pending(rx)) => rx.await.unwrap_or_else(|_| Err(ProviderError::default())),
                None => Ok(Vec::new()),
            }
        }

        fn on(&self, event: ProviderEvent, handler: AccountsHandler) {
            self.calls.borrow_mut().push(format!("on:{}", event.as_str()));
            self.listeners.borrow_mut().push(handler);
        }

        fn remove_listener(&self, event: ProviderEvent, handler: &AccountsHandler) {
            self.calls
                .borrow_mut()
                .push(format!("removeListener:{}", event.as_str()));
            self.listeners.borrow_mut().retain(|l| !Rc::ptr_eq(l, handler));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_method_names() {
        assert_eq!(RequestMethod::RequestAccounts.as_str(), "eth_requestAccounts");
        assert_eq!(RequestMethod::Accounts.as_str(), "eth_accounts");
        assert_eq!(ProviderEvent::AccountsChanged.as_str(), "accountsChanged");
    }

    #[test]
    fn test_user_rejection() {
        assert!(ProviderError::user_rejected().is_user_rejection());
        assert!(!ProviderError::new(-32002, "Request already pending").is_user_rejection());
        assert!(!ProviderError::default().is_user_rejection());
    }

    #[test]
    fn test_provider_error_deserialize() {
        let err: ProviderError =
            serde_json::from_str(r#"{"code":4001,"message":"User rejected the request."}"#).unwrap();
        assert!(err.is_user_rejection());

        let err: ProviderError = serde_json::from_str(r#"{"message":"boom"}"#).unwrap();
        assert_eq!(err.code, None);
        assert_eq!(err.message.as_deref(), Some("boom"));
    }

    #[test]
    fn test_user_rejection_requires_exact_code() {
        let fractional = ProviderError::from_rejection(&json!({ "code": 4001.5 }));
        assert!(!fractional.is_user_rejection());

        let stringly = ProviderError::from_rejection(&json!({ "code": "4001" }));
        assert!(!stringly.is_user_rejection());

        let float = ProviderError::from_rejection(&json!({ "code": 4001.0 }));
        assert!(float.is_user_rejection());
    }

    #[test]
    fn test_rejection_without_code() {
        let err = ProviderError::from_rejection(&json!({ "message": "Internal JSON-RPC error" }));
        assert_eq!(err.code, None);
        assert_eq!(err.message.as_deref(), Some("Internal JSON-RPC error"));

        let err = ProviderError::from_rejection(&json!("plain string"));
        assert_eq!(err.code, None);
        assert_eq!(err.message.as_deref(), Some("plain string"));

        assert_eq!(ProviderError::from_rejection(&json!(42)), ProviderError::default());
        assert_eq!(ProviderError::from_rejection(&Value::Null), ProviderError::default());
    }

    #[test]
    fn test_rejection_with_non_numeric_code_keeps_code() {
        let err = ProviderError::from_rejection(&json!({ "code": "E_PENDING", "message": "busy" }));
        assert_eq!(err.code, Some(json!("E_PENDING")));
        assert_eq!(err.message.as_deref(), Some("busy"));

        let err = ProviderError::from_rejection(&json!({ "code": null, "message": 7 }));
        assert_eq!(err.code, Some(Value::Null));
        assert_eq!(err.message, None);
    }

    #[test]
    fn test_accounts_from_response() {
        assert_eq!(accounts_from_response(Value::Null), Ok(vec![]));
        assert_eq!(accounts_from_response(json!([])), Ok(vec![]));
        assert_eq!(
            accounts_from_response(json!(["0x1111", "0x2222"])),
            Ok(vec!["0x1111".to_string(), "0x2222".to_string()])
        );
    }

    #[test]
    fn test_accounts_from_response_rejects_non_array() {
        for value in [json!("0x1111"), json!({ "0": "0x1111" }), json!([1, 2]), json!(true)] {
            let err = accounts_from_response(value).unwrap_err();
            assert_eq!(err.code, None);
            assert!(err.message.unwrap().starts_with("Unexpected provider response"));
        }
    }

    #[test]
    fn test_accounts_from_event() {
        assert_eq!(accounts_from_event(json!(["0x1111"])), vec!["0x1111".to_string()]);
        assert!(accounts_from_event(Value::Null).is_empty());
        assert!(accounts_from_event(json!("0x1111")).is_empty());
        assert!(accounts_from_event(json!({ "accounts": ["0x1111"] })).is_empty());
    }
}
