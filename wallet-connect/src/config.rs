//! Wallet configuration
//!
//! Compiled-in defaults, optionally overridden by a JSON block in the page:
//!
//! ```html
//! <script id="wallet-config" type="application/json">
//!   { "provider_name": "MetaMask", "stale_resolution": "last_writer_wins" }
//! </script>
//! ```

use serde::Deserialize;
use shared::utils::{ACCOUNT_PREFIX_LEN, ACCOUNT_SUFFIX_LEN};

use crate::utils::constants::{CONFIG_ELEMENT_ID, DEFAULT_INSTALL_URL, DEFAULT_PROVIDER_NAME};

/// What to do with an async result that was overtaken by a newer account write
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaleResolution {
    /// Drop the late result (account and error untouched).
    #[default]
    DiscardStale,
    /// Apply whatever settles last.
    LastWriterWins,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WalletConfig {
    /// Name used in messages ("MetaMask is not installed...")
    pub provider_name: String,
    /// Target of the install link shown next to a missing-provider error
    pub install_url: String,
    pub stale_resolution: StaleResolution,
    pub account_prefix_len: usize,
    pub account_suffix_len: usize,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            provider_name: DEFAULT_PROVIDER_NAME.to_string(),
            install_url: DEFAULT_INSTALL_URL.to_string(),
            stale_resolution: StaleResolution::default(),
            account_prefix_len: ACCOUNT_PREFIX_LEN,
            account_suffix_len: ACCOUNT_SUFFIX_LEN,
        }
    }
}

impl WalletConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Read the page's config block, falling back to defaults
    pub fn load() -> Self {
        let Some(json) = read_config_element() else {
            log::debug!("No #{} element, using default wallet config", CONFIG_ELEMENT_ID);
            return Self::default();
        };

        match Self::from_json(&json) {
            Ok(config) => {
                log::info!("Loaded wallet config for {}", config.provider_name);
                config
            }
            Err(e) => {
                log::warn!("Invalid #{} JSON ({}), using defaults", CONFIG_ELEMENT_ID, e);
                Self::default()
            }
        }
    }
}

fn read_config_element() -> Option<String> {
    let document = web_sys::window()?.document()?;
    let element = document.get_element_by_id(CONFIG_ELEMENT_ID)?;
    element.text_content().filter(|text| !text.trim().is_empty())
}
