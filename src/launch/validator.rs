//! Local checks on launch parameters, run before anything touches the network.

use log::debug;
use url::Url;

use crate::errors::ValidationError;
use crate::models::token::{LaunchInput, TokenLaunchRequest};

pub const MAX_SYMBOL_CHARS: usize = 10;
pub const MAX_DECIMALS: u8 = 9;

/// Checks rules in a fixed order and reports only the first violation.
#[derive(Debug, Default, Clone, Copy)]
pub struct LaunchRequestValidator;

impl LaunchRequestValidator {
    pub fn new() -> Self {
        LaunchRequestValidator
    }

    pub fn validate(&self, input: &LaunchInput) -> Result<TokenLaunchRequest, ValidationError> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(ValidationError::NameRequired);
        }

        let symbol = input.symbol.trim();
        if symbol.is_empty() {
            return Err(ValidationError::SymbolRequired);
        }
        let symbol_chars = symbol.chars().count();
        if symbol_chars > MAX_SYMBOL_CHARS {
            return Err(ValidationError::SymbolTooLong(symbol_chars));
        }

        let uri = input.uri.trim();
        if uri.is_empty() {
            return Err(ValidationError::UriRequired);
        }
        Url::parse(uri).map_err(|e| ValidationError::UriInvalid(e.to_string()))?;

        let supply = DecimalAmount::parse(&input.initial_supply)
            .ok_or(ValidationError::SupplyInvalid)?;
        if supply.negative || supply.is_zero() {
            return Err(ValidationError::SupplyNotPositive);
        }

        let decimals = DecimalAmount::parse(&input.decimals)
            .filter(DecimalAmount::is_integral)
            .ok_or(ValidationError::DecimalsInvalid)?;
        if decimals.negative && !decimals.is_zero() {
            return Err(ValidationError::DecimalsOutOfRange);
        }
        let decimals = match decimals.whole_value() {
            Some(value) if value <= MAX_DECIMALS as u128 => value as u8,
            _ => return Err(ValidationError::DecimalsOutOfRange),
        };

        let base_units = supply.to_base_units(decimals)?;
        debug!(
            "Validated launch {} ({}): {} base units at {} decimals",
            name, symbol, base_units, decimals
        );

        Ok(TokenLaunchRequest::new(
            name.to_string(),
            symbol.to_uppercase(),
            uri.to_string(),
            decimals,
            supply.text,
            base_units,
        ))
    }
}

/// A decimal in plain notation with an optional sign ("1000", "+12.5",
/// "-3", ".5"). Both numeric launch fields share this grammar; exponents
/// such as "1e3" are not accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
struct DecimalAmount {
    text: String,
    negative: bool,
    whole: String,
    fraction: String,
}

impl DecimalAmount {
    fn parse(raw: &str) -> Option<Self> {
        let text = raw.trim();
        let (negative, unsigned) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text.strip_prefix('+').unwrap_or(text)),
        };
        let (whole, fraction) = match unsigned.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (unsigned, ""),
        };
        let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
        if whole.is_empty() && fraction.is_empty() {
            return None;
        }
        if !all_digits(whole) || !all_digits(fraction) {
            return None;
        }
        Some(DecimalAmount {
            text: text.to_string(),
            negative,
            whole: whole.to_string(),
            fraction: fraction.to_string(),
        })
    }

    fn is_zero(&self) -> bool {
        self.whole.chars().chain(self.fraction.chars()).all(|c| c == '0')
    }

    fn is_integral(&self) -> bool {
        self.fraction.chars().all(|c| c == '0')
    }

    /// Magnitude of the integer part; `None` past `u128`.
    fn whole_value(&self) -> Option<u128> {
        self.whole.chars().try_fold(0u128, |acc, c| {
            acc.checked_mul(10)?.checked_add(c.to_digit(10)? as u128)
        })
    }

    /// `floor(self * 10^decimals)`, exactly.
    fn to_base_units(&self, decimals: u8) -> Result<u64, ValidationError> {
        let kept_fraction = self
            .fraction
            .chars()
            .chain(std::iter::repeat('0'))
            .take(decimals as usize);

        let mut units: u128 = 0;
        for c in self.whole.chars().chain(kept_fraction) {
            let digit = c.to_digit(10).ok_or(ValidationError::SupplyInvalid)? as u128;
            units = units
                .checked_mul(10)
                .and_then(|u| u.checked_add(digit))
                .ok_or(ValidationError::SupplyTooLarge)?;
        }

        if units == 0 {
            return Err(ValidationError::SupplyBelowBaseUnit(decimals));
        }
        u64::try_from(units).map_err(|_| ValidationError::SupplyTooLarge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(name: &str, symbol: &str, uri: &str, supply: &str, decimals: &str) -> LaunchInput {
        LaunchInput {
            name: name.to_string(),
            symbol: symbol.to_string(),
            uri: uri.to_string(),
            initial_supply: supply.to_string(),
            decimals: decimals.to_string(),
        }
    }

    fn demo() -> LaunchInput {
        input("Demo", "DMO", "https://example.com/demo.json", "1000", "6")
    }

    fn check(input: LaunchInput) -> Result<TokenLaunchRequest, ValidationError> {
        LaunchRequestValidator::new().validate(&input)
    }

    #[test]
    fn valid_request_computes_base_units() {
        let request = check(demo()).unwrap();
        assert_eq!(request.name(), "Demo");
        assert_eq!(request.symbol(), "DMO");
        assert_eq!(request.decimals(), 6);
        assert_eq!(request.base_units(), 1_000_000_000);
    }

    #[test]
    fn fields_are_trimmed_and_symbol_uppercased() {
        let request = check(input("  Demo ", " dmo ", " https://example.com/x ", " 5 ", " 0 ")).unwrap();
        assert_eq!(request.name(), "Demo");
        assert_eq!(request.symbol(), "DMO");
        assert_eq!(request.uri(), "https://example.com/x");
        assert_eq!(request.base_units(), 5);
    }

    #[test]
    fn first_failing_rule_wins() {
        let err = check(input("", "ABCDEFGHIJK", "", "abc", "12")).unwrap_err();
        assert_eq!(err, ValidationError::NameRequired);

        let err = check(input("Demo", "ABCDEFGHIJK", "", "abc", "12")).unwrap_err();
        assert_eq!(err, ValidationError::SymbolTooLong(11));

        let err = check(input("Demo", "DMO", "not a url", "abc", "12")).unwrap_err();
        assert!(matches!(err, ValidationError::UriInvalid(_)));

        let err = check(input("Demo", "DMO", "https://example.com", "abc", "12")).unwrap_err();
        assert_eq!(err, ValidationError::SupplyInvalid);
    }

    #[test]
    fn each_rule_reports_its_own_reason() {
        let cases = [
            (input("Demo", " ", "u", "1", "6"), ValidationError::SymbolRequired),
            (input("Demo", "DMO", "  ", "1", "6"), ValidationError::UriRequired),
            (input("Demo", "DMO", "https://a.b", "-5", "6"), ValidationError::SupplyNotPositive),
            (input("Demo", "DMO", "https://a.b", "1e3", "6"), ValidationError::SupplyInvalid),
            (input("Demo", "DMO", "https://a.b", "0.000", "6"), ValidationError::SupplyNotPositive),
            (input("Demo", "DMO", "https://a.b", "1", "six"), ValidationError::DecimalsInvalid),
            (input("Demo", "DMO", "https://a.b", "1", "1.5"), ValidationError::DecimalsInvalid),
            (input("Demo", "DMO", "https://a.b", "1", "10"), ValidationError::DecimalsOutOfRange),
            (input("Demo", "DMO", "https://a.b", "1", "-1"), ValidationError::DecimalsOutOfRange),
        ];
        for (raw, expected) in cases {
            assert_eq!(check(raw.clone()).unwrap_err(), expected, "input: {:?}", raw);
        }
    }

    #[test]
    fn supply_and_decimals_share_one_number_grammar() {
        let request = check(input("Demo", "DMO", "https://a.b", "+5", "+6")).unwrap();
        assert_eq!(request.base_units(), 5_000_000);

        let request = check(input("Demo", "DMO", "https://a.b", "5.0", "06")).unwrap();
        assert_eq!(request.decimals(), 6);
        assert_eq!(request.base_units(), 5_000_000);

        let request = check(input("Demo", "DMO", "https://a.b", "5", "6.0")).unwrap();
        assert_eq!(request.decimals(), 6);

        let request = check(input("Demo", "DMO", "https://a.b", "5", "-0")).unwrap();
        assert_eq!(request.decimals(), 0);

        assert_eq!(
            check(input("Demo", "DMO", "https://a.b", "1e3", "6")).unwrap_err(),
            ValidationError::SupplyInvalid
        );
        assert_eq!(
            check(input("Demo", "DMO", "https://a.b", "5", "6e0")).unwrap_err(),
            ValidationError::DecimalsInvalid
        );
        assert_eq!(
            check(input("Demo", "DMO", "https://a.b", "5", "+-6")).unwrap_err(),
            ValidationError::DecimalsInvalid
        );
        assert_eq!(
            check(input("Demo", "DMO", "https://a.b", "5", "99999999999999999999999999999999999999999")).unwrap_err(),
            ValidationError::DecimalsOutOfRange
        );
    }

    #[test]
    fn ten_character_symbol_is_allowed() {
        let request = check(input("Demo", "ABCDEFGHIJ", "https://a.b", "1", "0")).unwrap();
        assert_eq!(request.symbol(), "ABCDEFGHIJ");
    }

    #[test]
    fn fractional_supply_is_floored_exactly() {
        let request = check(input("Demo", "DMO", "https://a.b", "12.3456789", "6")).unwrap();
        assert_eq!(request.base_units(), 12_345_678);

        let request = check(input("Demo", "DMO", "https://a.b", "0.1", "9")).unwrap();
        assert_eq!(request.base_units(), 100_000_000);

        let err = check(input("Demo", "DMO", "https://a.b", "0.0000001", "6")).unwrap_err();
        assert_eq!(err, ValidationError::SupplyBelowBaseUnit(6));
    }

    #[test]
    fn supply_beyond_u64_is_rejected() {
        let err = check(input("Demo", "DMO", "https://a.b", "18446744074", "9")).unwrap_err();
        assert_eq!(err, ValidationError::SupplyTooLarge);

        let request = check(input("Demo", "DMO", "https://a.b", "18446744073.709551615", "9")).unwrap();
        assert_eq!(request.base_units(), u64::MAX);
    }
}
