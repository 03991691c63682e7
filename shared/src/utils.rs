//! # Shared Utility Functions
//!
//! Common utility functions used by the wallet-connect application.
//!
//! ## Address Formatting
//!
//! Functions for formatting Ethereum accounts for display:
//! - [`format_address`] - Format address with ellipsis (first N and last M characters)
//! - [`format_account`] - `format_address` with the 6/4 split used across the UI
//!
//! ## Usage
//!
//! ```rust
//! use shared::utils::format_address;
//!
//! let address = "0x1234567890123456789012345678901234567890";
//! let formatted = format_address(address, 6, 4);
//! assert_eq!(formatted, "0x1234...7890");
//! ```

/// Characters kept at the start of a displayed account (`0x` plus four hex digits).
pub const ACCOUNT_PREFIX_LEN: usize = 6;

/// Characters kept at the end of a displayed account.
pub const ACCOUNT_SUFFIX_LEN: usize = 4;

/// Format a wallet address by showing the first `prefix_len` and last `suffix_len` characters.
///
/// If the address is not longer than `prefix_len + suffix_len`, it is returned as-is.
/// Positions are counted in characters, so an unexpected non-ASCII value never splits a
/// code point.
///
/// # Arguments
///
/// * `address` - The wallet address to format
/// * `prefix_len` - Number of characters to show at the start
/// * `suffix_len` - Number of characters to show at the end
///
/// # Examples
///
/// ```rust
/// use shared::utils::format_address;
///
/// let addr = "0xABCDEF0123456789ABCDEF0123456789ABCDEF01";
/// assert_eq!(format_address(addr, 6, 4), "0xABCD...EF01");
/// assert_eq!(format_address(addr, 4, 4), "0xAB...EF01");
/// assert_eq!(format_address("0x1234", 6, 4), "0x1234");
/// ```
pub fn format_address(address: &str, prefix_len: usize, suffix_len: usize) -> String {
    let char_count = address.chars().count();

    if char_count <= prefix_len + suffix_len {
        return address.to_string();
    }

    let prefix: String = address.chars().take(prefix_len).collect();
    let suffix: String = address.chars().skip(char_count - suffix_len).collect();

    format!("{}...{}", prefix, suffix)
}

/// Format an account with the default 6-character prefix and 4-character suffix.
///
/// # Examples
///
/// ```rust
/// use shared::utils::format_account;
///
/// let addr = "0x1111111111111111111111111111111111112222";
/// assert_eq!(format_account(addr), "0x1111...2222");
/// ```
pub fn format_account(address: &str) -> String {
    format_address(address, ACCOUNT_PREFIX_LEN, ACCOUNT_SUFFIX_LEN)
}

/// Whether an error message is asking the user to install a wallet extension.
///
/// The modal pairs such messages with a download link. Matching is a
/// case-insensitive search for "install".
///
/// ```rust
/// use shared::utils::needs_install;
///
/// assert!(needs_install("Please INSTALL MetaMask"));
/// assert!(!needs_install("Connection request was rejected."));
/// ```
pub fn needs_install(message: &str) -> bool {
    message.to_lowercase().contains("install")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_address() {
        let addr = "0xABCDEF0123456789ABCDEF0123456789ABCDEF01";
        assert_eq!(format_address(addr, 6, 4), "0xABCD...EF01");
        assert_eq!(format_address(addr, 6, 6), "0xABCD...CDEF01");
        assert_eq!(format_address(addr, 2, 2), "0x...01");
    }

    #[test]
    fn test_format_address_short() {
        assert_eq!(format_address("0x12345678", 6, 4), "0x12345678");
        assert_eq!(format_address("abc", 6, 4), "abc");
        assert_eq!(format_address("", 6, 4), "");
    }

    #[test]
    fn test_format_address_just_over_threshold() {
        assert_eq!(format_address("0x123456789", 6, 4), "0x1234...6789");
    }

    #[test]
    fn test_format_address_non_ascii() {
        let addr = "ääääääääääääää";
        assert_eq!(format_address(addr, 6, 4), "ääääää...ääää");
    }

    #[test]
    fn test_format_account() {
        let addr = "0x1111111111111111111111111111111111112222";
        assert_eq!(format_account(addr), "0x1111...2222");
    }

    #[test]
    fn test_needs_install() {
        assert!(needs_install("MetaMask is not installed. Please install it to continue."));
        assert!(needs_install("Install a wallet"));
        assert!(!needs_install("No accounts found in MetaMask."));
        assert!(!needs_install("Failed to connect to MetaMask."));
    }
}
