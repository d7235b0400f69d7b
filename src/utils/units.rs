use ethers::{types::U256, utils::format_ether};

/// Ether amount with trailing zeros trimmed, keeping one decimal ("1.0", "0.25").
pub fn display_ether(wei: U256) -> String {
    let formatted = format_ether(wei);
    if !formatted.contains('.') {
        return format!("{}.0", formatted);
    }
    let trimmed = formatted.trim_end_matches('0');
    if trimmed.ends_with('.') {
        format!("{}0", trimmed)
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::utils::parse_ether;

    #[test]
    fn test_display_ether() {
        assert_eq!(display_ether(parse_ether("1").unwrap()), "1.0");
        assert_eq!(display_ether(parse_ether("0.25").unwrap()), "0.25");
        assert_eq!(display_ether(parse_ether("10000").unwrap()), "10000.0");
        assert_eq!(display_ether(U256::zero()), "0.0");
    }
}
