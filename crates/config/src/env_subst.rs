/// Replace `${ENV_VAR}` and `${ENV_VAR:-fallback}` placeholders in raw config text.
///
/// Unresolvable variables without a fallback are left as-is.
pub fn substitute_env(input: &str) -> String {
    substitute_with(input, |name| std::env::var(name).ok())
}

/// Same as [`substitute_env`], resolving names through `lookup`.
pub fn substitute_with(input: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut result = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        result.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            // Unterminated, emit the remainder literally.
            result.push_str(&rest[start..]);
            return result;
        };

        let body = &after[..end];
        let (name, fallback) = match body.split_once(":-") {
            Some((name, fallback)) => (name, Some(fallback)),
            None => (body, None),
        };

        match (name.is_empty(), lookup(name), fallback) {
            (false, Some(value), _) => result.push_str(&value),
            (false, None, Some(fallback)) => result.push_str(fallback),
            _ => {
                result.push_str("${");
                result.push_str(body);
                result.push('}');
            },
        }
        rest = &after[end + 1..];
    }

    result.push_str(rest);
    result
}

#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest};

    fn lookup(name: &str) -> Option<String> {
        (name == "PROMOTER_TOKEN").then(|| "abc:123".to_string())
    }

    #[rstest]
    #[case("token = \"${PROMOTER_TOKEN}\"", "token = \"abc:123\"")]
    #[case("${PROMOTER_MISSING}", "${PROMOTER_MISSING}")]
    #[case("${PROMOTER_MISSING:-24}", "24")]
    #[case("${PROMOTER_TOKEN:-unused}", "abc:123")]
    #[case("${}", "${}")]
    #[case("plain text", "plain text")]
    #[case("tail ${PROMOTER_TOKEN", "tail ${PROMOTER_TOKEN")]
    #[case("$PROMOTER_TOKEN", "$PROMOTER_TOKEN")]
    fn test_substitution(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(substitute_with(input, lookup), expected);
    }

    #[test]
    fn test_multiple_placeholders() {
        assert_eq!(
            substitute_with("${PROMOTER_TOKEN}/${X:-y}/end", lookup),
            "abc:123/y/end"
        );
    }
}
