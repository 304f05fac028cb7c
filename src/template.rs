//! URI template rendering
//!
//! Handles `{name}` placeholders in request paths, e.g.
//! `/content-discovery/v2/organizations/{orgId}/catalog-content`.
//! Every placeholder must be resolved from the path parameters.

use crate::error::{Error, Result};
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Regex for matching path placeholders: {name}
static PLACEHOLDER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\s*([a-zA-Z_][a-zA-Z0-9_]*)\s*\}").unwrap());

/// Render a URI template with the given path parameters
///
/// Fails with [`Error::UndefinedVariable`] naming every placeholder that has
/// no parameter. Values are inserted verbatim.
pub fn render(template: &str, params: &HashMap<String, String>) -> Result<String> {
    let mut result = String::with_capacity(template.len());
    let mut missing = Vec::new();
    let mut last = 0;

    for cap in PLACEHOLDER_REGEX.captures_iter(template) {
        let full_match = cap.get(0).unwrap();
        let name = cap.get(1).unwrap().as_str();

        result.push_str(&template[last..full_match.start()]);
        match params.get(name) {
            Some(value) => result.push_str(value),
            None => missing.push(name.to_string()),
        }
        last = full_match.end();
    }
    result.push_str(&template[last..]);

    if missing.is_empty() {
        Ok(result)
    } else {
        Err(Error::undefined_var(missing.join(", ")))
    }
}

/// Extract all placeholder names from a template
pub fn extract_variables(template: &str) -> Vec<String> {
    PLACEHOLDER_REGEX
        .captures_iter(template)
        .map(|cap| cap.get(1).unwrap().as_str().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test_case("/organizations/{orgId}/catalog", &[("orgId", "abc")], "/organizations/abc/catalog" ; "single placeholder")]
    #[test_case("/{a}/{b}/{a}", &[("a", "1"), ("b", "2")], "/1/2/1" ; "repeated placeholder")]
    #[test_case("/plain/path", &[], "/plain/path" ; "no placeholders")]
    #[test_case("/plain/path", &[("unused", "x")], "/plain/path" ; "extra params ignored")]
    #[test_case("/orgs/{ orgId }", &[("orgId", "abc")], "/orgs/abc" ; "whitespace inside braces")]
    fn test_render(template: &str, pairs: &[(&str, &str)], expected: &str) {
        assert_eq!(render(template, &params(pairs)).unwrap(), expected);
    }

    #[test]
    fn test_undefined_placeholder() {
        let result = render("/orgs/{orgId}/users/{userId}", &params(&[("orgId", "1")]));
        let err = result.unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Template);
        assert!(err.to_string().contains("userId"));
        assert!(!err.to_string().contains("orgId"));
    }

    #[test]
    fn test_value_containing_braces_is_not_rendered_again() {
        let result = render("/{a}/{b}", &params(&[("a", "{b}"), ("b", "x")])).unwrap();
        assert_eq!(result, "/{b}/x");
    }

    #[test]
    fn test_render_is_deterministic() {
        let p = params(&[("orgId", "8e1c7a3d")]);
        let template = "/content-discovery/v2/organizations/{orgId}/catalog-content";
        assert_eq!(render(template, &p).unwrap(), render(template, &p).unwrap());
    }

    #[test]
    fn test_extract_variables() {
        let vars = extract_variables("/orgs/{orgId}/users/{userId}");
        assert_eq!(vars, vec!["orgId", "userId"]);
    }
}
