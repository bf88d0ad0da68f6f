//! Parsing of user-typed currency amounts

/// Parse a typed amount into whole yen.
///
/// Every non-digit character (grouping commas, the yen sign, spaces) is
/// ignored. Returns `None` when no digits remain or the value overflows.
pub fn parse_amount(input: &str) -> Option<u64> {
    let digits: String = input.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}
