/// Trims an optional text field; blank becomes `None`
pub fn clean_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Upper-cased currency code, `CZK` when blank
pub fn currency_or_default(value: Option<String>) -> String {
    clean_optional(value)
        .map(|c| c.to_uppercase())
        .unwrap_or_else(|| DEFAULT_CURRENCY.to_string())
}

pub const DEFAULT_CURRENCY: &str = "CZK";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_optional() {
        assert_eq!(clean_optional(None), None);
        assert_eq!(clean_optional(Some("   ".into())), None);
        assert_eq!(clean_optional(Some(" Praha ".into())), Some("Praha".into()));
    }

    #[test]
    fn test_currency_or_default() {
        assert_eq!(currency_or_default(None), "CZK");
        assert_eq!(currency_or_default(Some("".into())), "CZK");
        assert_eq!(currency_or_default(Some(" eur ".into())), "EUR");
    }
}
