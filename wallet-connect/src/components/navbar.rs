//! Navigation Bar Component

use leptos::prelude::*;
use leptos_router::components::A;

use crate::state::wallet::use_wallet_context;

#[component]
pub fn Navbar() -> impl IntoView {
    let wallet_ctx = use_wallet_context();

    view! {
        <nav>
            <div class="nav-inner">
                <A href="/" attr:class="nav-link-clean">
                    <span class="nav-title">"PropChain"</span>
                </A>
                <div class="nav-links">
                    <A href="/status" attr:class="nav-link">"Wallet"</A>
                    <button
                        class="btn nav-wallet"
                        class:connected=move || wallet_ctx.is_connected()
                        on:click=move |_| wallet_ctx.open_modal()
                    >
                        {move || wallet_ctx
                            .formatted_account()
                            .unwrap_or_else(|| "Connect Wallet".to_string())}
                    </button>
                </div>
            </div>
        </nav>
    }
}
