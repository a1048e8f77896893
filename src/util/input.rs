//! Lenient parsing of form fields. Bad input never errors; it counts as zero.

use serde::{de::DeserializeOwned, Deserialize, Deserializer};

/// Digits only, like the quantity boxes: `"1,200"` → 1200, `""` → 0.
pub fn parse_quantity(raw: &str) -> u64 {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    digits.parse().unwrap_or(0)
}

/// Non-negative decimal; anything unparsable, negative or non-finite is 0.
pub fn parse_amount(raw: &str) -> f64 {
    parse_optional_amount(raw).unwrap_or(0.0)
}

/// `None` for an empty field. Stray characters are stripped first and a
/// second decimal point is folded into the fraction.
pub fn parse_optional_amount(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    let normalized = match cleaned.split_once('.') {
        Some((whole, fraction)) => format!("{whole}.{}", fraction.replace('.', "")),
        None => cleaned,
    };
    Some(
        normalized
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && *v >= 0.0)
            .unwrap_or(0.0),
    )
}

/// A JSON field that may arrive as a number, a string or null.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Field {
    Number(f64),
    Text(String),
}

impl Field {
    pub fn quantity(&self) -> u64 {
        match self {
            Field::Number(n) if n.is_finite() && *n > 0.0 => n.floor() as u64,
            Field::Number(_) => 0,
            Field::Text(text) => parse_quantity(text),
        }
    }

    pub fn amount(&self) -> Option<f64> {
        match self {
            Field::Number(n) => Some(if n.is_finite() && *n > 0.0 { *n } else { 0.0 }),
            Field::Text(text) => parse_optional_amount(text),
        }
    }
}

/// Deserialize helper for optional lenient fields.
pub fn lenient<'de, D>(deserializer: D) -> Result<Option<Field>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Field>::deserialize(deserializer).unwrap_or(None))
}

/// Deserialize helper that replaces any malformed value with `T::default()`.
pub fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantities_strip_everything_but_digits() {
        assert_eq!(parse_quantity("1,200"), 1200);
        assert_eq!(parse_quantity(""), 0);
        assert_eq!(parse_quantity("-30"), 30);
        assert_eq!(parse_quantity("abc"), 0);
    }

    #[test]
    fn amounts_default_to_zero() {
        assert_eq!(parse_amount("12.5"), 12.5);
        assert_eq!(parse_amount("1.2.3"), 1.23);
        assert_eq!(parse_amount("x"), 0.0);
        assert_eq!(parse_optional_amount(""), None);
        assert_eq!(parse_optional_amount("."), Some(0.0));
    }

    #[test]
    fn malformed_values_fall_back_to_default() {
        #[derive(Deserialize)]
        struct Payload {
            #[serde(deserialize_with = "or_default")]
            size: u32,
            #[serde(deserialize_with = "or_default")]
            tag: Option<String>,
        }
        let parsed: Payload =
            serde_json::from_str(r#"{"size": "eight", "tag": {"nested": [1]}}"#).expect("json");
        assert_eq!(parsed.size, 0);
        assert_eq!(parsed.tag, None);
    }

    #[test]
    fn fields_accept_numbers_and_text() {
        let fields: Vec<Field> = serde_json::from_str(r#"[30, "45", -2, "7.5"]"#).expect("json");
        assert_eq!(fields[0].quantity(), 30);
        assert_eq!(fields[1].quantity(), 45);
        assert_eq!(fields[2].quantity(), 0);
        assert_eq!(fields[3].amount(), Some(7.5));
    }
}
