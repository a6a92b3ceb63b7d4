use serde::{Deserialize, Serialize};
use std::fmt;

/// Selector strategy for finding page elements
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locator {
    Id(String),
    Name(String),
    Css(String),
    XPath(String),
}

impl Locator {
    pub fn id(value: impl Into<String>) -> Self {
        Locator::Id(value.into())
    }

    pub fn name(value: impl Into<String>) -> Self {
        Locator::Name(value.into())
    }

    pub fn css(value: impl Into<String>) -> Self {
        Locator::Css(value.into())
    }

    pub fn xpath(value: impl Into<String>) -> Self {
        Locator::XPath(value.into())
    }

    /// Express this locator as a CSS selector. XPath has no CSS equivalent.
    pub fn to_css(&self) -> Option<String> {
        match self {
            Locator::Id(id) => Some(format!("[id=\"{}\"]", escape_attr(id))),
            Locator::Name(name) => Some(format!("[name=\"{}\"]", escape_attr(name))),
            Locator::Css(css) => Some(css.clone()),
            Locator::XPath(_) => None,
        }
    }

    /// The raw selector text
    pub fn value(&self) -> &str {
        match self {
            Locator::Id(v) | Locator::Name(v) | Locator::Css(v) | Locator::XPath(v) => v,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.value().trim().is_empty()
    }
}

fn escape_attr(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Id(v) => write!(f, "id={}", v),
            Locator::Name(v) => write!(f, "name={}", v),
            Locator::Css(v) => write!(f, "css={}", v),
            Locator::XPath(v) => write!(f, "xpath={}", v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_and_name_become_attribute_selectors() {
        assert_eq!(Locator::id("email").to_css().unwrap(), "[id=\"email\"]");
        assert_eq!(Locator::name("q").to_css().unwrap(), "[name=\"q\"]");
        assert_eq!(Locator::css("div.g").to_css().unwrap(), "div.g");
        assert!(Locator::xpath("//div").to_css().is_none());
    }

    #[test]
    fn test_attribute_values_are_escaped() {
        assert_eq!(
            Locator::name("a\"b").to_css().unwrap(),
            "[name=\"a\\\"b\"]"
        );
    }

    #[test]
    fn test_locator_serializes_as_tagged_value() {
        let json = serde_json::to_string(&Locator::css(".item")).unwrap();
        assert_eq!(json, r#"{"css":".item"}"#);

        let parsed: Locator = serde_json::from_str(r#"{"xpath":"//h3"}"#).unwrap();
        assert_eq!(parsed, Locator::xpath("//h3"));
    }

    #[test]
    fn test_display_includes_strategy() {
        assert_eq!(Locator::id("search").to_string(), "id=search");
    }
}
