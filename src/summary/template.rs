use std::collections::HashMap;

use lazy_regex::regex;

/// Shown in place of a placeholder that has no value.
pub const NOT_SPECIFIED: &str = "Not specified";

/// How a placeholder key is transformed before it is looked up in the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderCase {
    /// `{oc}` looks up `OC`.
    Upper,
    /// `{OC}` looks up `oc`.
    Lower,
}

impl PlaceholderCase {
    fn apply(self, key: &str) -> String {
        match self {
            PlaceholderCase::Upper => key.to_uppercase(),
            PlaceholderCase::Lower => key.to_lowercase(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryField {
    /// The placeholder key as written in the template.
    pub label: String,
    pub value: String,
}

impl SummaryField {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> SummaryField {
        SummaryField {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Renders every `{KEY}` placeholder of `template` into a field.
///
/// Fields come out in template order and repeated placeholders are repeated.
/// Missing or blank values become [`NOT_SPECIFIED`].
pub fn render(
    template: &str,
    data: &HashMap<String, String>,
    case: PlaceholderCase,
) -> Vec<SummaryField> {
    regex!(r"\{([^}]+)\}")
        .captures_iter(template)
        .map(|captures| {
            let key = &captures[1];
            let value = data
                .get(&case.apply(key))
                .map(String::as_str)
                .filter(|value| !value.trim().is_empty())
                .unwrap_or(NOT_SPECIFIED);

            SummaryField::new(key, value)
        })
        .collect()
}
