//! Wallet connection errors
//!
//! Every variant renders to the message shown in the modal. Store actions
//! never return these; they are turned into `ConnectionState::error`.

use thiserror::Error;

use crate::services::ethereum::ProviderError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalletError {
    /// No compatible provider injected into the page
    #[error("{provider} is not installed. Please install it to continue.")]
    ProviderMissing { provider: String },

    /// The request succeeded but authorized nothing
    #[error("No accounts found in {provider}.")]
    NoAccountsReturned { provider: String },

    /// EIP-1193 code 4001
    #[error("Connection request was rejected.")]
    UserRejected,

    /// Any other rejection with a `code` key, with the provider's own message
    #[error("{message}")]
    Provider { message: String },

    /// Rejection without a usable message
    #[error("Failed to connect to {provider}.")]
    ConnectFailed { provider: String },

    #[error("use_wallet_context() called outside of a component tree that called provide_wallet_context()")]
    ContextMissing,
}

impl WalletError {
    /// Map a provider rejection onto the user-facing taxonomy
    ///
    /// Only rejections that carry a `code` key (of any type) surface the
    /// provider's message; anything else falls back to the generic text.
    pub fn from_provider(err: ProviderError, provider: &str) -> Self {
        match err.code {
            Some(_) if err.is_user_rejection() => WalletError::UserRejected,
            Some(_) => match err.message {
                Some(message) => WalletError::Provider { message },
                None => WalletError::ConnectFailed {
                    provider: provider.to_string(),
                },
            },
            None => WalletError::ConnectFailed {
                provider: provider.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let missing = WalletError::ProviderMissing {
            provider: "MetaMask".to_string(),
        };
        assert_eq!(
            missing.to_string(),
            "MetaMask is not installed. Please install it to continue."
        );
        assert_eq!(
            WalletError::NoAccountsReturned {
                provider: "MetaMask".to_string()
            }
            .to_string(),
            "No accounts found in MetaMask."
        );
        assert_eq!(
            WalletError::UserRejected.to_string(),
            "Connection request was rejected."
        );
    }

    #[test]
    fn test_from_provider_rejection() {
        let err = WalletError::from_provider(ProviderError::user_rejected(), "MetaMask");
        assert_eq!(err, WalletError::UserRejected);
    }

    #[test]
    fn test_from_provider_coded_message() {
        let err = WalletError::from_provider(
            ProviderError::new(-32002, "Request of type 'wallet_requestPermissions' already pending"),
            "MetaMask",
        );
        assert_eq!(
            err.to_string(),
            "Request of type 'wallet_requestPermissions' already pending"
        );
    }

    #[test]
    fn test_from_provider_generic_fallback() {
        let coded_without_message = ProviderError {
            code: Some(serde_json::Value::from(-32603)),
            message: None,
        };
        assert_eq!(
            WalletError::from_provider(coded_without_message, "MetaMask").to_string(),
            "Failed to connect to MetaMask."
        );

        let uncoded = ProviderError {
            code: None,
            message: Some("something odd".to_string()),
        };
        assert_eq!(
            WalletError::from_provider(uncoded, "MetaMask").to_string(),
            "Failed to connect to MetaMask."
        );
    }

    #[test]
    fn test_from_provider_non_numeric_code_surfaces_message() {
        let err = ProviderError::from_rejection(&serde_json::json!({
            "code": "E_PENDING",
            "message": "Request already pending",
        }));
        assert_eq!(
            WalletError::from_provider(err, "MetaMask").to_string(),
            "Request already pending"
        );
    }
}
