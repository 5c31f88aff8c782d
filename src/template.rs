//! Environment interpolation for YAML configs
//!
//! Expands `${VAR}` and `${VAR:-default}` references before the config is
//! parsed, so secrets can live in the environment instead of the file.

use crate::error::{Error, Result};
use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Regex for matching variables: ${NAME} or ${NAME:-default}
static ENV_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}").unwrap()
});

/// Expand variables from the process environment
pub fn expand_env(text: &str) -> Result<String> {
    expand_with(text, |name| std::env::var(name).ok())
}

/// Expand variables using `lookup`.
///
/// Every undefined variable without a default is reported in one error.
pub fn expand_with<F>(text: &str, lookup: F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    let mut missing = Vec::new();

    let expanded = ENV_REGEX.replace_all(text, |cap: &Captures<'_>| {
        let name = &cap[1];
        match (lookup(name), cap.get(2)) {
            (Some(value), _) => value,
            (None, Some(default)) => default.as_str().to_string(),
            (None, None) => {
                if !missing.iter().any(|m| m == name) {
                    missing.push(name.to_string());
                }
                String::new()
            }
        }
    });

    if missing.is_empty() {
        Ok(expanded.into_owned())
    } else {
        Err(Error::undefined_var(missing.join(", ")))
    }
}

/// Check if a string references any variables
pub fn has_variables(s: &str) -> bool {
    ENV_REGEX.is_match(s)
}

/// Extract all variable names, in order of appearance
pub fn extract_variables(text: &str) -> Vec<String> {
    ENV_REGEX
        .captures_iter(text)
        .map(|cap| cap[1].to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_simple_substitution() {
        let env = vars(&[("CLIENT_SECRET", "s3cret")]);
        let result = expand_with("client_secret: ${CLIENT_SECRET}", |n| env.get(n).cloned()).unwrap();
        assert_eq!(result, "client_secret: s3cret");
    }

    #[test]
    fn test_multiple_substitutions() {
        let env = vars(&[("HOST", "gw.example.com"), ("VERSION", "v1")]);
        let result =
            expand_with("https://${HOST}/${VERSION}/retrieve", |n| env.get(n).cloned()).unwrap();
        assert_eq!(result, "https://gw.example.com/v1/retrieve");
    }

    #[test]
    fn test_default_value() {
        let env = vars(&[("SET", "yes")]);
        let lookup = |n: &str| env.get(n).cloned();
        assert_eq!(expand_with("${UNSET:-60}", lookup).unwrap(), "60");
        assert_eq!(expand_with("${SET:-no}", lookup).unwrap(), "yes");
        assert_eq!(expand_with("[${UNSET:-}]", lookup).unwrap(), "[]");
    }

    #[test]
    fn test_undefined_variables_reported_together() {
        let err = expand_with("${A} ${B} ${A}", |_| None).unwrap_err();
        assert!(matches!(err, Error::UndefinedVariable { .. }));
        assert_eq!(err.to_string(), "Undefined environment variable: A, B");
    }

    #[test]
    fn test_no_variables() {
        let text = "plain: $HOME and {braces}";
        assert_eq!(expand_with(text, |_| None).unwrap(), text);
        assert!(!has_variables(text));
    }

    #[test]
    fn test_extract_variables() {
        assert_eq!(
            extract_variables("${ONE} and ${TWO:-x}"),
            vec!["ONE", "TWO"]
        );
    }

    #[test]
    fn test_expand_env_reads_process_environment() {
        if let Ok(path) = std::env::var("PATH") {
            assert_eq!(expand_env("${PATH}").unwrap(), path);
        }
        assert!(expand_env("${PAGEWALK_SURELY_UNDEFINED_VAR}").is_err());
    }
}
