//! Environment variable expansion for configuration strings.

use crate::ConfigError;

/// Expand `${VAR}` and `${VAR:-default}` references in a config value.
///
/// An unset `${VAR}` without default is an error naming `field`. Only braced
/// references are expanded; a bare `$VAR` stays literal even next to one.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    let mut expanded = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        let Some(len) = rest[start..].find('}') else {
            break;
        };
        expanded.push_str(&rest[..start]);
        expanded.push_str(&expand_reference(&rest[start..=start + len], field)?);
        rest = &rest[start + len + 1..];
    }
    expanded.push_str(rest);

    Ok(expanded)
}

/// Expand a single `${...}` reference.
fn expand_reference(reference: &str, field: &str) -> Result<String, ConfigError> {
    shellexpand::env_with_context(reference, |var| -> Result<Option<String>, LookupError> {
        std::env::var(var).map(Some).map_err(|_| LookupError {
            var_name: var.to_owned(),
        })
    })
    .map(std::borrow::Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{0}}} not set", e.cause.var_name),
    })
}

/// Failed environment lookup.
struct LookupError {
    var_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_simple_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("PULSAR_SITE_TEST_HOST", "staging.example.org");
        }
        let result = expand_env("https://${PULSAR_SITE_TEST_HOST}", "site.url").unwrap();
        assert_eq!(result, "https://staging.example.org");
        unsafe {
            std::env::remove_var("PULSAR_SITE_TEST_HOST");
        }
    }

    #[test]
    fn test_expand_default_used_when_unset() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("PULSAR_SITE_UNSET_URL");
        }
        let result = expand_env(
            "${PULSAR_SITE_UNSET_URL:-https://pulsar.apache.org}",
            "site.url",
        )
        .unwrap();
        assert_eq!(result, "https://pulsar.apache.org");
    }

    #[test]
    fn test_expand_missing_var_error() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("PULSAR_SITE_MISSING");
        }
        let err = expand_env("${PULSAR_SITE_MISSING}", "links.javadoc").unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("PULSAR_SITE_MISSING"));
        assert!(err.to_string().contains("links.javadoc"));
    }

    #[test]
    fn test_literal_and_bare_dollar_unchanged() {
        assert_eq!(
            expand_env("https://pulsar.apache.org", "site.url").unwrap(),
            "https://pulsar.apache.org"
        );
        assert_eq!(
            expand_env("https://example.org/$path", "site.url").unwrap(),
            "https://example.org/$path"
        );
    }

    #[test]
    fn test_bare_dollar_kept_next_to_braced_reference() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("PULSAR_SITE_BARE_UNSET");
        }
        let result = expand_env(
            "${PULSAR_SITE_BARE_UNSET:-https://example.org}/$PULSAR_SITE_BARE_UNSET",
            "site.url",
        )
        .unwrap();
        assert_eq!(result, "https://example.org/$PULSAR_SITE_BARE_UNSET");
    }

    #[test]
    fn test_unterminated_reference_is_literal() {
        assert_eq!(
            expand_env("https://example.org/${oops", "site.url").unwrap(),
            "https://example.org/${oops"
        );
    }
}
