//! Human-scaled renderings of yen amounts

/// Major display unit: 1億 = 10^8 yen
pub const OKU: u64 = 100_000_000;

/// Minor display unit: 1万 = 10^4 yen
pub const MAN: u64 = 10_000;

/// Group digits in threes: `1234567` → `1,234,567`
pub fn format_grouped(amount: u64) -> String {
    let digits = amount.to_string();
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Split into 億 and 万 parts, each printed only when non-zero.
///
/// `325_000_000` → `3億2500万円`. The remainder below one 万 is not shown;
/// amounts under one 万 fall back to the grouped form with a `円` suffix.
pub fn format_large_unit(amount: u64) -> String {
    let oku = amount / OKU;
    let man = (amount % OKU) / MAN;

    match (oku, man) {
        (0, 0) => format!("{}円", format_grouped(amount)),
        (0, man) => format!("{}万円", man),
        (oku, 0) => format!("{}億円", oku),
        (oku, man) => format!("{}億{}万円", oku, man),
    }
}
