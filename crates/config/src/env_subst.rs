//! `${VAR}` and `${VAR:-fallback}` expansion over raw config text.

/// Expand placeholders from the process environment.
///
/// Unset variables without a fallback are left as written, so a missing
/// credential shows up verbatim instead of silently becoming empty.
#[must_use]
pub fn substitute_env(input: &str) -> String {
    substitute_with(input, |name| std::env::var(name).ok())
}

pub(crate) fn substitute_with(input: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            // Unterminated: keep the remainder literally.
            out.push_str(&rest[start..]);
            return out;
        };

        let placeholder = &after[..end];
        let (name, fallback) = match placeholder.split_once(":-") {
            Some((name, fallback)) => (name, Some(fallback)),
            None => (placeholder, None),
        };

        match (name.is_empty(), lookup(name), fallback) {
            (false, Some(value), _) => out.push_str(&value),
            (false, None, Some(fallback)) => out.push_str(fallback),
            _ => out.push_str(&rest[start..start + 2 + end + 1]),
        }
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest};

    fn lookup(name: &str) -> Option<String> {
        match name {
            "WABA_SOURCE" => Some("+15555555555".to_string()),
            "WABA_EMPTY" => Some(String::new()),
            _ => None,
        }
    }

    #[rstest]
    #[case("source = \"${WABA_SOURCE}\"", "source = \"+15555555555\"")]
    #[case("${WABA_SOURCE}/${WABA_SOURCE}", "+15555555555/+15555555555")]
    #[case("${WABA_MISSING}", "${WABA_MISSING}")]
    #[case("${WABA_MISSING:-media}", "media")]
    #[case("${WABA_EMPTY:-media}", "")]
    #[case("${}", "${}")]
    #[case("tail ${WABA_SOURCE", "tail ${WABA_SOURCE")]
    #[case("price: $5", "price: $5")]
    #[case("plain text", "plain text")]
    fn expands(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(substitute_with(input, lookup), expected);
    }
}
