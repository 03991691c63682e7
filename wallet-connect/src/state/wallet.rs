//! Wallet state management
//!
//! One [`WalletContext`] is provided at the application root. Components read
//! its signals and call its actions; nothing else mutates connection state
//! except the provider's `accountsChanged` notification.
//!
//! Account writes are stamped with an epoch. `connect_metamask`, `disconnect`
//! and the account-change listener each start a new epoch; under
//! [`StaleResolution::DiscardStale`] an async result whose epoch is no longer
//! current does not write `account`. Connect attempts are numbered separately:
//! only the newest attempt reports its error and clears `is_connecting`.
//! Closing the modal starts neither, so a connect that resolves after the
//! modal closed still lands.

use std::rc::Rc;

use leptos::prelude::*;
use shared::utils::format_address;

use crate::config::{StaleResolution, WalletConfig};
use crate::error::WalletError;
use crate::services::ethereum::{
    detect_injected_provider, AccountsHandler, EthereumProvider, ProviderEvent, RequestMethod,
};

/// Everything the presentation layer renders from
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConnectionState {
    /// Address as reported by the provider; never validated.
    pub account: Option<String>,
    pub is_modal_open: bool,
    /// True only while an `eth_requestAccounts` call is outstanding.
    pub is_connecting: bool,
    pub error: Option<String>,
}

/// Global wallet context
#[derive(Clone, Copy)]
pub struct WalletContext {
    pub state: RwSignal<ConnectionState>,
    provider: StoredValue<Option<Rc<dyn EthereumProvider>>, LocalStorage>,
    listener: StoredValue<Option<AccountsHandler>, LocalStorage>,
    config: StoredValue<WalletConfig>,
    epoch: StoredValue<u64>,
    attempt: StoredValue<u64>,
}

impl WalletContext {
    pub fn new(provider: Option<Rc<dyn EthereumProvider>>, config: WalletConfig) -> Self {
        Self {
            state: RwSignal::new(ConnectionState::default()),
            provider: StoredValue::new_local(provider),
            listener: StoredValue::new_local(None),
            config: StoredValue::new(config),
            epoch: StoredValue::new(0),
            attempt: StoredValue::new(0),
        }
    }

    // ------------------------------------------------------------------
    // Readers
    // ------------------------------------------------------------------

    /// Current state without subscribing the caller
    pub fn snapshot(&self) -> ConnectionState {
        self.state.get_untracked()
    }

    pub fn account(&self) -> Option<String> {
        self.state.with(|state| state.account.clone())
    }

    /// `0xABCD...EF01`, or `None` while disconnected
    pub fn formatted_account(&self) -> Option<String> {
        let (prefix, suffix) = self
            .config
            .with_value(|c| (c.account_prefix_len, c.account_suffix_len));
        self.state.with(|state| {
            state
                .account
                .as_deref()
                .map(|account| format_address(account, prefix, suffix))
        })
    }

    pub fn is_connected(&self) -> bool {
        self.state.with(|state| state.account.is_some())
    }

    pub fn is_modal_open(&self) -> bool {
        self.state.with(|state| state.is_modal_open)
    }

    pub fn is_connecting(&self) -> bool {
        self.state.with(|state| state.is_connecting)
    }

    pub fn error(&self) -> Option<String> {
        self.state.with(|state| state.error.clone())
    }

    pub fn provider_name(&self) -> String {
        self.config.with_value(|c| c.provider_name.clone())
    }

    pub fn install_url(&self) -> String {
        self.config.with_value(|c| c.install_url.clone())
    }

    // ------------------------------------------------------------------
    // Actions
    // ------------------------------------------------------------------

    pub fn open_modal(&self) {
        self.state.update(|state| {
            state.is_modal_open = true;
            state.error = None;
        });
    }

    /// Hide the modal and reset its transient flags. An outstanding connect
    /// request keeps running.
    pub fn close_modal(&self) {
        self.state.update(|state| {
            state.is_modal_open = false;
            state.is_connecting = false;
            state.error = None;
        });
    }

    pub fn reset_error(&self) {
        self.state.update(|state| state.error = None);
    }

    /// Forget the account locally. The provider keeps its own authorization.
    pub fn disconnect(&self) {
        self.next_epoch();
        self.state.update(|state| state.account = None);
        log::info!("Wallet disconnected");
    }

    /// Ask the provider for account access
    ///
    /// Always resolves; failures end up in `state.error`. `is_connecting` is
    /// false again once the newest outstanding attempt settles, whatever the
    /// outcome.
    pub async fn connect_metamask(self) {
        let provider_name = self.provider_name();

        let Some(provider) = self.compatible_provider() else {
            let err = WalletError::ProviderMissing {
                provider: provider_name,
            };
            log::warn!("{}", err);
            self.state.update(|state| state.error = Some(err.to_string()));
            return;
        };

        let attempt = self.next_attempt();
        let ticket = self.next_epoch();
        self.state.update(|state| {
            state.is_connecting = true;
            state.error = None;
        });
        log::debug!("Requesting {} accounts (epoch {})", provider_name, ticket);

        let outcome = match provider.request(RequestMethod::RequestAccounts).await {
            Ok(accounts) => accounts
                .into_iter()
                .next()
                .ok_or_else(|| WalletError::NoAccountsReturned {
                    provider: provider_name.clone(),
                }),
            Err(e) => {
                log::debug!("{} rejected eth_requestAccounts: {:?}", provider_name, e);
                Err(WalletError::from_provider(e, &provider_name))
            }
        };

        let account_fresh = self.accepts(ticket);
        let latest_attempt = self.is_latest_attempt(attempt);
        match &outcome {
            Ok(account) if account_fresh => {
                log::info!("{} connected: {}", provider_name, account)
            }
            Ok(_) => log::debug!("Dropping stale connect result (epoch {})", ticket),
            Err(e) if latest_attempt => log::warn!("{} connection failed: {}", provider_name, e),
            Err(e) => log::debug!("Dropping error of superseded connect #{}: {}", attempt, e),
        }

        self.state.try_update(|state| {
            match outcome {
                Ok(account) if account_fresh => state.account = Some(account),
                Err(e) if latest_attempt => state.error = Some(e.to_string()),
                _ => {}
            }
            if latest_attempt {
                state.is_connecting = false;
            }
        });
    }

    // ------------------------------------------------------------------
    // Provider subscription
    // ------------------------------------------------------------------

    /// Adopt an account the provider already authorized, without prompting
    pub async fn sync_authorized_accounts(self) {
        let Some(provider) = self.provider() else {
            return;
        };
        let ticket = self.current_epoch();

        match provider.request(RequestMethod::Accounts).await {
            Ok(accounts) => {
                let Some(account) = accounts.into_iter().next() else {
                    log::debug!("No previously authorized accounts");
                    return;
                };
                if !self.accepts(ticket) {
                    log::debug!("Dropping stale eth_accounts result (epoch {})", ticket);
                    return;
                }
                log::info!("Restored authorized account {}", account);
                self.state.try_update(|state| state.account = Some(account));
            }
            Err(e) => log::debug!("eth_accounts failed: {:?}", e),
        }
    }

    /// Register the `accountsChanged` listener once
    pub fn subscribe_account_changes(self) {
        let Some(provider) = self.provider() else {
            return;
        };
        if self.listener.with_value(|l| l.is_some()) {
            return;
        }

        let handler: AccountsHandler = Rc::new(move |accounts: Vec<String>| {
            self.apply_accounts_changed(accounts);
        });
        provider.on(ProviderEvent::AccountsChanged, handler.clone());
        self.listener.set_value(Some(handler));
    }

    /// Deregister the listener; safe to call more than once
    pub fn teardown(self) {
        let Some(handler) = self.listener.try_update_value(|l| l.take()).flatten() else {
            return;
        };
        if let Some(provider) = self.provider() {
            provider.remove_listener(ProviderEvent::AccountsChanged, &handler);
        }
        log::debug!("Wallet listener removed");
    }

    fn apply_accounts_changed(&self, accounts: Vec<String>) {
        self.next_epoch();
        let account = accounts.into_iter().next();
        match &account {
            Some(a) => log::info!("Provider switched account to {}", a),
            None => log::info!("Provider reports no connected accounts"),
        }
        self.state.try_update(|state| state.account = account);
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn provider(&self) -> Option<Rc<dyn EthereumProvider>> {
        self.provider.try_get_value().flatten()
    }

    /// Provider present and flagged as MetaMask
    fn compatible_provider(&self) -> Option<Rc<dyn EthereumProvider>> {
        self.provider().filter(|p| p.is_metamask())
    }

    fn next_epoch(&self) -> u64 {
        self.epoch
            .try_update_value(|epoch| {
                *epoch += 1;
                *epoch
            })
            .unwrap_or_default()
    }

    fn current_epoch(&self) -> u64 {
        self.epoch.try_get_value().unwrap_or_default()
    }

    fn next_attempt(&self) -> u64 {
        self.attempt
            .try_update_value(|attempt| {
                *attempt += 1;
                *attempt
            })
            .unwrap_or_default()
    }

    fn is_latest_attempt(&self, attempt: u64) -> bool {
        match self.config.with_value(|c| c.stale_resolution) {
            StaleResolution::LastWriterWins => true,
            StaleResolution::DiscardStale => {
                self.attempt.try_get_value().unwrap_or_default() == attempt
            }
        }
    }

    fn accepts(&self, ticket: u64) -> bool {
        match self.config.with_value(|c| c.stale_resolution) {
            StaleResolution::LastWriterWins => true,
            StaleResolution::DiscardStale => self.current_epoch() == ticket,
        }
    }
}

pub fn provide_wallet_context(config: WalletConfig) -> WalletContext {
    let provider = detect_injected_provider();
    if provider.is_none() {
        log::info!("No injected Ethereum provider found");
    }

    let context = WalletContext::new(provider, config);
    context.subscribe_account_changes();
    leptos::task::spawn_local(context.sync_authorized_accounts());
    on_cleanup(move || context.teardown());

    provide_context(context);
    context
}

pub fn try_use_wallet_context() -> Result<WalletContext, WalletError> {
    use_context::<WalletContext>().ok_or(WalletError::ContextMissing)
}

/// Typed accessor for components; panics when no context was provided
pub fn use_wallet_context() -> WalletContext {
    match try_use_wallet_context() {
        Ok(context) => context,
        Err(e) => panic!("{}", e),
    }
}
