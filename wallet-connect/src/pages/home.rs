//! Home Page - entry point that opens the wallet modal

use leptos::prelude::*;

use crate::state::wallet::use_wallet_context;

#[component]
pub fn HomePage() -> impl IntoView {
    let wallet_ctx = use_wallet_context();

    view! {
        <div class="content-wrapper">
            <div class="left-section">
                <h1 class="main-header">"PropChain"</h1>
                <p class="main-subheader">"Real estate, on-chain"</p>
                <p class="signup-text">
                    {move || if wallet_ctx.is_connected() {
                        "Your wallet is linked".to_string()
                    } else {
                        format!("Connect {} to browse token-gated listings", wallet_ctx.provider_name())
                    }}
                </p>
                <button class="btn" on:click=move |_| wallet_ctx.open_modal()>
                    {move || if wallet_ctx.is_connected() { "Manage Wallet" } else { "Connect Wallet" }}
                </button>
            </div>
        </div>
    }
}
