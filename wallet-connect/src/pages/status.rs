//! Wallet Status Page - Show connected wallet info

use leptos::prelude::*;
use leptos_router::hooks::use_navigate;
use crate::state::wallet::use_wallet_context;

#[component]
pub fn StatusPage() -> impl IntoView {
    let wallet_ctx = use_wallet_context();
    let navigate = use_navigate();

    let on_disconnect = move |_| {
        wallet_ctx.disconnect();
        navigate("/", Default::default());
    };

    view! {
        <div class="app-container status-page">
            <div class="card">
                <h1 class="card-title">"Wallet Status"</h1>

                {move || {
                    let disconnect = on_disconnect.clone();

                    match wallet_ctx.account() {
                        Some(address) => view! {
                            <div>
                                <div class="status-box">
                                    <p class="label">"Status"</p>
                                    <p class="status-connected">
                                        {format!("Connected with {}", wallet_ctx.provider_name())}
                                    </p>

                                    <p class="label">"Wallet Address"</p>
                                    <p class="wallet-address">{address}</p>
                                </div>

                                <button class="btn btn-danger" on:click=disconnect>
                                    "Disconnect Wallet"
                                </button>
                            </div>
                        }.into_any(),
                        None => view! {
                            <div>
                                <p class="subtitle">"No wallet connected"</p>
                                <button class="btn" on:click=move |_| wallet_ctx.open_modal()>
                                    "Connect Wallet"
                                </button>
                            </div>
                        }.into_any(),
                    }
                }}
            </div>
        </div>
    }
}
