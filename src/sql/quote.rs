use crate::error::{EtlError, Result};

/// Render `value` as a single-quoted SQL string literal.
///
/// Object-storage URIs and role ARNs come straight from the operator's config
/// file, so they never reach a statement unquoted. Embedded quotes and
/// backslashes are doubled; control characters are refused outright.
pub fn quote_literal(value: &str) -> Result<String> {
    if value.chars().any(char::is_control) {
        return Err(EtlError::UnsafeLiteral {
            value: value.to_string(),
        });
    }

    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('\'');
    for c in value.chars() {
        match c {
            '\'' => quoted.push_str("''"),
            '\\' => quoted.push_str("\\\\"),
            c => quoted.push(c),
        }
    }
    quoted.push('\'');
    Ok(quoted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotes_plain_values() {
        assert_eq!(
            quote_literal("s3://udacity-dend/log_data").unwrap(),
            "'s3://udacity-dend/log_data'"
        );
        assert_eq!(quote_literal("").unwrap(), "''");
    }

    #[test]
    fn doubles_quotes_and_backslashes() {
        assert_eq!(
            quote_literal("s3://bucket/it's").unwrap(),
            "'s3://bucket/it''s'"
        );
        assert_eq!(quote_literal(r"a\b").unwrap(), r"'a\\b'");
        assert_eq!(
            quote_literal("x'; DROP TABLE users; --").unwrap(),
            "'x''; DROP TABLE users; --'"
        );
    }

    #[test]
    fn rejects_control_characters() {
        assert!(matches!(
            quote_literal("arn:aws:iam::1:role/x\n"),
            Err(EtlError::UnsafeLiteral { .. })
        ));
        assert!(quote_literal("a\0b").is_err());
    }
}
