//! PropChain Wallet App - Leptos Frontend
//!
//! Routes plus the wallet modal, all sharing one wallet context

use leptos::prelude::*;
use leptos_router::{
    components::{A, Route, Router, Routes},
    path,
};

use crate::components::{Navbar, WalletModal};
use crate::config::WalletConfig;
use crate::pages::{HomePage, StatusPage};
use crate::state::wallet::provide_wallet_context;

#[component]
pub fn App() -> impl IntoView {
    provide_wallet_context(WalletConfig::load());

    view! {
        <Router>
            <div class="app-container">
                <Navbar/>
                <Routes fallback=|| view! { <NotFound/> }>
                    <Route path=path!("/") view=HomePage/>
                    <Route path=path!("/status") view=StatusPage/>
                </Routes>
                <WalletModal/>
            </div>
        </Router>
    }
}

#[component]
fn NotFound() -> impl IntoView {
    view! {
        <div class="app-container not-found">
            <div class="card">
                <h1>"404 - Page Not Found"</h1>
                <p class="subtitle">"The page you're looking for doesn't exist."</p>
                <A href="/">
                    <span class="btn">"Go to Home"</span>
                </A>
            </div>
        </div>
    }
}
