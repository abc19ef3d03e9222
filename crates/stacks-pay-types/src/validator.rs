//! Pre-dispatch checks for payment payloads.
//!
//! Both checks fail closed: anything that is not clearly valid returns `false`.
//! Callers that need the reason should use
//! [`StxAddress::parse`](crate::address::StxAddress::parse) or
//! [`MicroStx::parse`] directly.

use crate::address;
use crate::networks::Network;
use crate::util::MicroStx;

/// `true` iff `address` is `SP` + 32 uppercase alphanumerics on mainnet, or
/// `ST` + 32 uppercase alphanumerics on testnet and devnet.
pub fn is_valid_address(address: &str, network: Network) -> bool {
    address::matches_network(address, network)
}

/// `true` iff `amount` is a non-negative integer literal strictly greater than zero.
pub fn is_valid_amount(amount: &str) -> bool {
    MicroStx::parse(amount).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_body(prefix: &str, body: &str) -> String {
        format!("{prefix}{body}")
    }

    const BODY: &str = "0123456789ABCDEFGHJKMNPQRSTVWXYZ";

    #[test]
    fn test_body_is_32_chars() {
        assert_eq!(BODY.len(), 32);
    }

    #[test]
    fn test_mainnet_addresses() {
        assert!(is_valid_address(&with_body("SP", BODY), Network::Mainnet));
        assert!(!is_valid_address(&with_body("ST", BODY), Network::Mainnet));
        assert!(!is_valid_address(&with_body("SP", &BODY[1..]), Network::Mainnet));
        assert!(!is_valid_address(&with_body("SP", &format!("{BODY}A")), Network::Mainnet));
        assert!(!is_valid_address(&with_body("SP", &BODY.to_lowercase()), Network::Mainnet));
        assert!(!is_valid_address("", Network::Mainnet));
    }

    #[test]
    fn test_testnet_and_devnet_addresses() {
        let address = with_body("ST", BODY);
        assert!(is_valid_address(&address, Network::Testnet));
        assert!(is_valid_address(&address, Network::Devnet));
        assert!(!is_valid_address(&with_body("SP", BODY), Network::Testnet));
        assert!(!is_valid_address(&format!(" {address}"), Network::Testnet));
    }

    #[test]
    fn test_agrees_with_address_parser() {
        use crate::address::StxAddress;
        for network in Network::ALL {
            for candidate in [with_body("SP", BODY), with_body("ST", BODY), "ST1".to_string()] {
                assert_eq!(
                    is_valid_address(&candidate, network),
                    StxAddress::parse(&candidate, network).is_ok()
                );
            }
        }
    }

    #[test]
    fn test_amounts() {
        assert!(is_valid_amount("1"));
        assert!(is_valid_amount("1000000"));
        assert!(is_valid_amount("99999999999999999999999999999999999999999"));
        for bad in ["0", "-5", "abc", "", "1.5", "1e6", "+1", " 1"] {
            assert!(!is_valid_amount(bad), "{bad:?} should be invalid");
        }
    }
}
