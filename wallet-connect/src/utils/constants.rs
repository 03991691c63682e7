//! Application constants

pub const DEFAULT_PROVIDER_NAME: &str = "MetaMask";
pub const DEFAULT_INSTALL_URL: &str = "https://metamask.io/download/";

// DOM element ids in index.html
pub const CONFIG_ELEMENT_ID: &str = "wallet-config";
pub const LOADING_ELEMENT_ID: &str = "app-loading";
