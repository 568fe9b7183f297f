use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::errors::CheckoutError;

/// Country profile for phone normalization and validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhoneProfile {
    /// International prefix, including the leading `+` (e.g. "+254")
    pub country_code: String,
    /// Human-readable name used in validation messages
    pub display_name: String,
    /// Hint shown next to the phone input
    pub placeholder: String,
    /// Total length of a valid normalized number, country code included
    pub validation_length: usize,
    /// Second digit of a trunk-prefixed local number ("07xx", "01xx"), also
    /// accepted as the leading digit when the trunk zero is omitted
    pub trunk_digits: Vec<char>,
}

macro_rules! profile {
    ($cc:literal, $name:literal, $ph:literal, $len:literal, [$($d:literal),+]) => {
        PhoneProfile {
            country_code: $cc.to_string(),
            display_name: $name.to_string(),
            placeholder: $ph.to_string(),
            validation_length: $len,
            trunk_digits: vec![$($d),+],
        }
    };
}

static PROFILES: Lazy<HashMap<&'static str, PhoneProfile>> = Lazy::new(|| {
    HashMap::from([
        (
            "KE",
            profile!("+254", "Kenya (+254)", "07xxxxxxxx or 01xxxxxxxx", 13, ['7', '1']),
        ),
        (
            "UG",
            profile!("+256", "Uganda (+256)", "07xxxxxxxx or 03xxxxxxxx", 13, ['7', '3']),
        ),
        (
            "TZ",
            profile!("+255", "Tanzania (+255)", "07xxxxxxxx or 06xxxxxxxx", 13, ['7', '6']),
        ),
        (
            "NG",
            profile!("+234", "Nigeria (+234)", "070xxxxxxxx or 080xxxxxxxx", 14, ['7', '8', '9']),
        ),
        (
            "GH",
            profile!("+233", "Ghana (+233)", "024xxxxxxx or 054xxxxxxx", 13, ['2', '5']),
        ),
    ])
});

pub const DEFAULT_COUNTRY: &str = "KE";

/// Looks up the profile for a country key, falling back to the default.
pub fn profile_for(country: &str) -> PhoneProfile {
    PROFILES
        .get(country)
        .or_else(|| PROFILES.get(DEFAULT_COUNTRY))
        .cloned()
        .unwrap_or_else(|| profile!("+254", "Kenya (+254)", "07xxxxxxxx or 01xxxxxxxx", 13, ['7', '1']))
}

/// Strips everything except digits and a leading `+`.
fn clean(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        if ch.is_ascii_digit() {
            out.push(ch);
        } else if ch == '+' && out.is_empty() {
            out.push('+');
        }
    }
    out
}

impl PhoneProfile {
    /// Length of the subscriber part of a valid number, country code
    /// excluded.
    fn subscriber_length(&self) -> usize {
        self.validation_length.saturating_sub(self.country_code.len())
    }

    /// Converts free-form phone input to canonical international form.
    ///
    /// Rules apply in order: already-international input is returned as-is;
    /// bare country digits gain a `+`; a trunk-prefixed local number ("07…")
    /// has its leading zero replaced with the country code; a full-length
    /// subscriber number without the trunk zero gets the country code
    /// prepended. Anything else is returned cleaned and will fail validation
    /// downstream.
    pub fn normalize(&self, input: &str) -> String {
        let cleaned = clean(input);
        if cleaned.starts_with(&self.country_code) {
            return cleaned;
        }
        let bare_code = &self.country_code[1..];
        if cleaned.starts_with(bare_code) {
            return format!("+{}", cleaned);
        }

        let mut chars = cleaned.chars();
        match (chars.next(), chars.next()) {
            (Some('0'), Some(second)) if self.trunk_digits.contains(&second) => {
                format!("{}{}", self.country_code, &cleaned[1..])
            }
            (Some(first), _)
                if self.trunk_digits.contains(&first)
                    && cleaned.len() == self.subscriber_length() =>
            {
                format!("{}{}", self.country_code, cleaned)
            }
            _ => cleaned,
        }
    }

    /// Validates and returns the normalized number, or a human-readable
    /// error naming the expected country format.
    pub fn validate(&self, input: &str) -> Result<String, CheckoutError> {
        let normalized = self.normalize(input);
        if normalized.len() == self.validation_length && normalized.starts_with(&self.country_code)
        {
            Ok(normalized)
        } else {
            Err(CheckoutError::ValidationError(format!(
                "Please enter a valid {} phone number",
                self.display_name
            )))
        }
    }

    /// Regional display grouping, e.g. `+254 712 345 678`.
    pub fn format_for_display(&self, input: &str) -> String {
        let normalized = self.normalize(input);
        if normalized.len() != self.validation_length {
            return normalized;
        }
        let groups: &[usize] = match self.country_code.as_str() {
            "+234" => &[3, 3, 4],
            "+233" => &[2, 3, 4],
            _ => &[3, 3, 3],
        };
        let rest = &normalized[self.country_code.len()..];
        let mut out = self.country_code.clone();
        let mut offset = 0;
        for &len in groups {
            if offset >= rest.len() {
                break;
            }
            let end = (offset + len).min(rest.len());
            out.push(' ');
            out.push_str(&rest[offset..end]);
            offset = end;
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kenya() -> PhoneProfile {
        profile_for("KE")
    }

    #[test]
    fn normalization_table() {
        let p = kenya();
        assert_eq!(p.normalize("0712345678"), "+254712345678");
        assert_eq!(p.normalize("254712345678"), "+254712345678");
        assert_eq!(p.normalize("712345678"), "+254712345678");
        assert_eq!(p.normalize("+254712345678"), "+254712345678");
        assert_eq!(p.normalize("12345"), "12345");
    }

    #[test]
    fn normalization_is_idempotent() {
        let p = kenya();
        let once = p.normalize("0712 345 678");
        assert_eq!(p.normalize(&once), once);
    }

    #[test]
    fn trunk_zero_with_one_is_accepted() {
        let p = kenya();
        assert_eq!(p.normalize("0112345678"), "+254112345678");
        assert_eq!(p.normalize("112345678"), "+254112345678");
    }

    #[test]
    fn partial_local_input_is_left_unchanged() {
        let p = kenya();
        // Leading 7/1 alone does not imply a subscriber number; only a
        // full-length one gains the country code.
        assert_eq!(p.normalize("71234"), "71234");
        assert_eq!(p.normalize("1234567890123"), "1234567890123");
        assert!(p.validate("71234").is_err());
        assert_eq!(p.normalize("712345678"), "+254712345678");
    }

    #[test]
    fn punctuation_is_stripped() {
        let p = kenya();
        assert_eq!(p.normalize("07 12-34(56)78"), "+254712345678");
    }

    #[test]
    fn validation_requires_exact_length_and_prefix() {
        let p = kenya();
        assert_eq!(p.validate("0712345678").unwrap(), "+254712345678");
        assert!(p.validate("071234567").is_err());
        assert!(p.validate("07123456789").is_err());
        assert!(p.validate("12345").is_err());
    }

    #[test]
    fn validation_message_names_the_country() {
        let err = kenya().validate("12345").unwrap_err();
        assert!(err.to_string().contains("Kenya (+254)"));
    }

    #[test]
    fn unknown_country_falls_back_to_default() {
        let p = profile_for("ZZ");
        assert_eq!(p.country_code, "+254");
    }

    #[test]
    fn nigeria_uses_fourteen_characters() {
        let p = profile_for("NG");
        assert_eq!(p.normalize("07012345678"), "+2347012345678");
        assert_eq!(p.validate("07012345678").unwrap(), "+2347012345678");
    }

    #[test]
    fn display_grouping() {
        let p = kenya();
        assert_eq!(p.format_for_display("0712345678"), "+254 712 345 678");
        let ng = profile_for("NG");
        assert_eq!(ng.format_for_display("07012345678"), "+234 701 234 5678");
    }
}
