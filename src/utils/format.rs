//! Quantity parsing and unit-bearing display strings.

use crate::utils::config::DIAGNOSTIC_EXCERPT_LIMIT;

/// Parse a quantity from hex (`0x` prefix) or decimal
pub fn parse_quantity(value: &str) -> Option<u128> {
    let value = value.trim();
    if let Some(hex_str) = value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        if hex_str.is_empty() {
            return Some(0);
        }
        u128::from_str_radix(hex_str, 16).ok()
    } else {
        value.parse::<u128>().ok()
    }
}

/// Format a wei amount as ether
///
/// Amounts below 1e-6 ETH are shown in wei so they do not round to zero.
pub fn format_ether(wei: u128) -> String {
    let eth_value = wei as f64 / 1e18;
    if wei == 0 {
        "0 ETH".to_string()
    } else if eth_value < 0.000001 {
        format!("{} wei", wei)
    } else {
        format!("{:.6} ETH", eth_value)
    }
}

/// Format a wei amount as gwei
pub fn format_gwei(wei: u128) -> String {
    format!("{:.2} Gwei", wei as f64 / 1e9)
}

/// Keep the tail of tool output for error messages
///
/// Tools print their final error last, so the end of the text is kept.
pub fn excerpt(text: &str) -> String {
    let text = text.trim();
    let count = text.chars().count();
    if count <= DIAGNOSTIC_EXCERPT_LIMIT {
        return text.to_string();
    }
    let tail: String = text.chars().skip(count - DIAGNOSTIC_EXCERPT_LIMIT).collect();
    format!("...{}", tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("1000"), Some(1000));
        assert_eq!(parse_quantity("0x3e8"), Some(1000));
        assert_eq!(parse_quantity("0x"), Some(0));
        assert_eq!(parse_quantity("invalid"), None);
    }

    #[test]
    fn test_format_ether() {
        assert_eq!(format_ether(0), "0 ETH");
        assert_eq!(format_ether(1_000), "1000 wei");
        assert_eq!(format_ether(1_500_000_000_000_000_000), "1.500000 ETH");
    }

    #[test]
    fn test_format_gwei() {
        assert_eq!(format_gwei(25_000_000_000), "25.00 Gwei");
    }

    #[test]
    fn test_excerpt_keeps_tail() {
        let long = format!("{}END", "x".repeat(DIAGNOSTIC_EXCERPT_LIMIT * 2));
        let short = excerpt(&long);
        assert!(short.starts_with("..."));
        assert!(short.ends_with("END"));
        assert_eq!(short.chars().count(), DIAGNOSTIC_EXCERPT_LIMIT + 3);
        assert_eq!(excerpt("  short  "), "short");
    }
}
