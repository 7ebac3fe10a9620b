/// Parse a numeric literal: an optional `-` followed by decimal digits or a `0x`, `0o` or `0b`
/// prefixed number.
pub fn parse_number(token: &str) -> Option<i64> {
    let (negative, digits) = match token.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, token),
    };

    let value = if let Some(hex) = digits.strip_prefix("0x") {
        parse_digits(hex, 16)?
    } else if let Some(octal) = digits.strip_prefix("0o") {
        parse_digits(octal, 8)?
    } else if let Some(binary) = digits.strip_prefix("0b") {
        parse_digits(binary, 2)?
    } else {
        parse_digits(digits, 10)?
    };

    Some(if negative { -value } else { value })
}

fn parse_digits(digits: &str, radix: u32) -> Option<i64> {
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    i64::from_str_radix(digits, radix).ok()
}
