use std::fmt;

/// Money is represented as integer minor units (kobo) to avoid floating-point drift.
/// 1 naira = 100 kobo, so ₦2000.00 = 200000.
pub type Cents = i64;

/// Format cents as a human-readable amount.
/// Example: 5000 -> "50.00", -1234 -> "-12.34"
pub fn format_cents(cents: Cents) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs_cents = cents.unsigned_abs();
    let units = abs_cents / 100;
    let remainder = abs_cents % 100;
    format!("{}{}.{:02}", sign, units, remainder)
}

/// Parse a decimal string into cents.
/// Example: "50.00" -> 5000, "12.5" -> 1250, "100" -> 10000
///
/// Fractional digits past the second must be zeros; anything finer than a kobo
/// is rejected rather than rounded. Signs are accepted, so the result may be
/// zero or negative; see [`parse_amount`] for the positive-only
/// variant used by ledger operations.
pub fn parse_cents(input: &str) -> Result<Cents, AmountError> {
    let input = input.trim();
    let (negative, digits) = match input.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, input.strip_prefix('+').unwrap_or(input)),
    };

    let (units_str, decimal_str) = match digits.split_once('.') {
        Some((units, decimals)) => (units, decimals),
        None => (digits, ""),
    };

    if units_str.is_empty() && decimal_str.is_empty() {
        return Err(AmountError::InvalidFormat);
    }
    if !all_digits(units_str) || !all_digits(decimal_str) {
        return Err(AmountError::InvalidFormat);
    }

    let units: i64 = if units_str.is_empty() {
        0
    } else {
        units_str.parse().map_err(|_| AmountError::InvalidFormat)?
    };

    if decimal_str.len() > 2 && decimal_str[2..].bytes().any(|b| b != b'0') {
        return Err(AmountError::TooPrecise);
    }

    // Pad to exactly two digits
    let decimal_cents: i64 = match decimal_str.len() {
        0 => 0,
        1 => decimal_str.parse::<i64>().map_err(|_| AmountError::InvalidFormat)? * 10,
        _ => decimal_str[..2]
            .parse()
            .map_err(|_| AmountError::InvalidFormat)?,
    };

    let cents = units
        .checked_mul(100)
        .and_then(|c| c.checked_add(decimal_cents))
        .ok_or(AmountError::InvalidFormat)?;

    Ok(if negative { -cents } else { cents })
}

/// Parse a monetary amount that must be strictly positive.
///
/// Every deposit, withdrawal and transfer goes through this before any
/// store mutation is attempted.
pub fn parse_amount(input: &str) -> Result<Cents, AmountError> {
    let cents = parse_cents(input)?;
    if cents <= 0 {
        return Err(AmountError::NotPositive);
    }
    Ok(cents)
}

fn all_digits(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_digit())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountError {
    InvalidFormat,
    /// More than two significant decimal places
    TooPrecise,
    NotPositive,
}

impl fmt::Display for AmountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AmountError::InvalidFormat => write!(f, "not a numeric amount"),
            AmountError::TooPrecise => write!(f, "more than two decimal places"),
            AmountError::NotPositive => write!(f, "amount must be greater than zero"),
        }
    }
}

impl std::error::Error for AmountError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_cents() {
        assert_eq!(format_cents(5000), "50.00");
        assert_eq!(format_cents(1234), "12.34");
        assert_eq!(format_cents(1), "0.01");
        assert_eq!(format_cents(0), "0.00");
        assert_eq!(format_cents(-5000), "-50.00");
        assert_eq!(format_cents(-1), "-0.01");
    }

    #[test]
    fn test_parse_cents() {
        assert_eq!(parse_cents("50.00"), Ok(5000));
        assert_eq!(parse_cents("50"), Ok(5000));
        assert_eq!(parse_cents(" 2000 "), Ok(200000));
        assert_eq!(parse_cents("12.5"), Ok(1250));
        assert_eq!(parse_cents(".50"), Ok(50));
        assert_eq!(parse_cents("7."), Ok(700));
        assert_eq!(parse_cents("+3"), Ok(300));
        assert_eq!(parse_cents("-50.00"), Ok(-5000));
        assert_eq!(parse_cents("100.990"), Ok(10099)); // Trailing zeros are harmless
    }

    #[test]
    fn test_parse_cents_invalid() {
        for input in ["", ".", "abc", "12.34.56", "1 000", "5.-3", "--5", "1e3", "99999999999999999999"] {
            assert_eq!(parse_cents(input), Err(AmountError::InvalidFormat), "{input:?}");
        }
    }

    #[test]
    fn test_parse_cents_rejects_sub_kobo_digits() {
        for input in ["100.999", "10.009", "0.009", "0.001", "-1.005"] {
            assert_eq!(parse_cents(input), Err(AmountError::TooPrecise), "{input:?}");
        }
        assert_eq!(parse_amount("0.009"), Err(AmountError::TooPrecise));
    }

    #[test]
    fn test_parse_amount_rejects_non_positive() {
        assert_eq!(parse_amount("0"), Err(AmountError::NotPositive));
        assert_eq!(parse_amount("0.00"), Err(AmountError::NotPositive));
        assert_eq!(parse_amount("-10"), Err(AmountError::NotPositive));
        assert_eq!(parse_amount("ten"), Err(AmountError::InvalidFormat));
        assert_eq!(parse_amount("0.01"), Ok(1));
    }
}
