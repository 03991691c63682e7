//! # Shared Wallet Helpers
//!
//! Browser-independent pieces of the wallet connection layer. Everything here
//! compiles and tests on the host target, so the wasm crate can keep its
//! display rules in one place.
//!
//! ## Structure
//!
//! - **[`utils`]**: Shared utility functions
//!   - **[`utils::format_address`]**: Shorten an address to a prefix and suffix
//!   - **[`utils::format_account`]**: The `0xABCD...EF01` form shown in the navbar and modal
//!   - **[`utils::needs_install`]**: Whether an error message asks the user to install a wallet
//!
//! ## Usage
//!
//! ```rust
//! use shared::utils::{format_account, needs_install};
//!
//! let display = format_account("0xABCDEF0123456789ABCDEF0123456789ABCDEF01");
//! assert_eq!(display, "0xABCD...EF01");
//! assert!(needs_install("MetaMask is not installed. Please install it to continue."));
//! ```

pub mod utils;

pub use utils::*;
