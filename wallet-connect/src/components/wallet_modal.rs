//! Wallet Modal - connect / connected views over the wallet context

use leptos::prelude::*;
use shared::utils::needs_install;

use crate::state::wallet::use_wallet_context;

#[component]
pub fn WalletModal() -> impl IntoView {
    let wallet_ctx = use_wallet_context();

    view! {
        <Show when=move || wallet_ctx.is_modal_open()>
            <div class="modal-backdrop" on:click=move |_| wallet_ctx.close_modal()>
                <div class="modal-card" on:click=|ev| ev.stop_propagation()>
                    <button
                        class="modal-close"
                        aria-label="Close"
                        on:click=move |_| wallet_ctx.close_modal()
                    >
                        "×"
                    </button>

                    <div class="modal-header">
                        <h2>"Connect your wallet"</h2>
                        <p class="subtitle">
                            "Choose a wallet provider to link with PropChain and unlock blockchain-powered experiences."
                        </p>
                    </div>

                    {move || if wallet_ctx.is_connected() {
                        view! { <ConnectedView/> }.into_any()
                    } else {
                        view! { <ConnectView/> }.into_any()
                    }}
                </div>
            </div>
        </Show>
    }
}

#[component]
fn ConnectedView() -> impl IntoView {
    let wallet_ctx = use_wallet_context();
    let provider_name = wallet_ctx.provider_name();

    view! {
        <div class="connected">
            <div class="success">
                <p class="connected-title">{format!("Connected with {}", provider_name)}</p>
                <p class="wallet-address">{move || wallet_ctx.formatted_account()}</p>
                <p class="connected-hint">
                    "You can now access token-gated listings and NFT features."
                </p>
            </div>
            <div class="modal-actions">
                <button class="btn btn-danger" on:click=move |_| wallet_ctx.disconnect()>
                    "Disconnect"
                </button>
                <button class="btn" on:click=move |_| wallet_ctx.close_modal()>
                    "Close"
                </button>
            </div>
        </div>
    }
}

#[component]
fn ConnectView() -> impl IntoView {
    let wallet_ctx = use_wallet_context();
    let provider_name = wallet_ctx.provider_name();
    let install_url = wallet_ctx.install_url();

    let connect = move |_| {
        leptos::task::spawn_local(wallet_ctx.connect_metamask());
    };

    view! {
        <div class="connect">
            <button
                class="wallet-button"
                disabled=move || wallet_ctx.is_connecting()
                on:click=connect
            >
                <span class="wallet-name">{provider_name.clone()}</span>
                <span class="wallet-kind">"Browser extension & mobile wallet"</span>
                <span class="wallet-action">
                    {move || if wallet_ctx.is_connecting() { "Connecting..." } else { "Connect" }}
                </span>
            </button>

            {move || wallet_ctx.error().map(|err| {
                let install_link = needs_install(&err).then(|| view! {
                    <a href=install_url.clone() target="_blank" rel="noreferrer" class="install-link">
                        {format!("Get {}", provider_name)}
                    </a>
                });
                view! {
                    <div class="error">
                        <p>{err}</p>
                        {install_link}
                    </div>
                }
            })}

            <p class="terms">
                "By connecting a wallet, you agree to our Terms of Service and acknowledge our Privacy Policy."
            </p>
        </div>
    }
}
