use serde::{Deserialize, Serialize};

/// A structured filter on a string field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StringFilter {
    IsEqualTo { values: Vec<String> },
    IsNotEqualTo { values: Vec<String> },
    StartsWith { values: Vec<String> },
    DoesNotStartWith { values: Vec<String> },
    Contains { values: Vec<String> },
    DoesNotContain { values: Vec<String> },
    EndsWith { values: Vec<String> },
    DoesNotEndWith { values: Vec<String> },
    IsBlank,
    IsNotBlank,
    IsNull,
    IsNotNull,
    Custom { partial: String },
}

/// Operator of a `StringFilter`, without its operands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StringFilterType {
    IsEqualTo,
    IsNotEqualTo,
    StartsWith,
    DoesNotStartWith,
    Contains,
    DoesNotContain,
    EndsWith,
    DoesNotEndWith,
    IsBlank,
    IsNotBlank,
    IsNull,
    IsNotNull,
    Custom,
}

impl StringFilter {
    pub fn filter_type(&self) -> StringFilterType {
        match self {
            StringFilter::IsEqualTo { .. } => StringFilterType::IsEqualTo,
            StringFilter::IsNotEqualTo { .. } => StringFilterType::IsNotEqualTo,
            StringFilter::StartsWith { .. } => StringFilterType::StartsWith,
            StringFilter::DoesNotStartWith { .. } => StringFilterType::DoesNotStartWith,
            StringFilter::Contains { .. } => StringFilterType::Contains,
            StringFilter::DoesNotContain { .. } => StringFilterType::DoesNotContain,
            StringFilter::EndsWith { .. } => StringFilterType::EndsWith,
            StringFilter::DoesNotEndWith { .. } => StringFilterType::DoesNotEndWith,
            StringFilter::IsBlank => StringFilterType::IsBlank,
            StringFilter::IsNotBlank => StringFilterType::IsNotBlank,
            StringFilter::IsNull => StringFilterType::IsNull,
            StringFilter::IsNotNull => StringFilterType::IsNotNull,
            StringFilter::Custom { .. } => StringFilterType::Custom,
        }
    }

    fn values(&self) -> Option<&[String]> {
        match self {
            StringFilter::IsEqualTo { values }
            | StringFilter::IsNotEqualTo { values }
            | StringFilter::StartsWith { values }
            | StringFilter::DoesNotStartWith { values }
            | StringFilter::Contains { values }
            | StringFilter::DoesNotContain { values }
            | StringFilter::EndsWith { values }
            | StringFilter::DoesNotEndWith { values } => Some(values),
            _ => None,
        }
    }
}

/// Filter code for `field`
///
/// A value list that is empty matches everything and is written `true`.
pub fn string_filter_code(field: &str, filter: &StringFilter) -> String {
    match filter {
        StringFilter::IsEqualTo { values } => matching(field, "=", "|", values, |v| v.to_string()),
        StringFilter::IsNotEqualTo { values } => matching(field, "!=", "&", values, |v| v.to_string()),
        StringFilter::Contains { values } => {
            matching(field, "~", "|", values, |v| format!("%{}%", escape_percents(v)))
        }
        StringFilter::DoesNotContain { values } => {
            matching(field, "!~", "&", values, |v| format!("%{}%", escape_percents(v)))
        }
        StringFilter::StartsWith { values } => {
            matching(field, "~", "|", values, |v| format!("{}%", escape_percents(v)))
        }
        StringFilter::DoesNotStartWith { values } => {
            matching(field, "!~", "&", values, |v| format!("{}%", escape_percents(v)))
        }
        StringFilter::EndsWith { values } => {
            matching(field, "~", "|", values, |v| format!("%{}", escape_percents(v)))
        }
        StringFilter::DoesNotEndWith { values } => {
            matching(field, "!~", "&", values, |v| format!("%{}", escape_percents(v)))
        }
        StringFilter::IsBlank => format!("{} = ''", field),
        StringFilter::IsNotBlank => format!("{} != ''", field),
        StringFilter::IsNull => format!("{} = null", field),
        StringFilter::IsNotNull => format!("{} != null", field),
        StringFilter::Custom { partial } => format!("{}: {}", field, partial),
    }
}

/// Switch operator, keeping the value list when both sides have one
pub fn string_filter_change_type(filter: &StringFilter, filter_type: StringFilterType) -> StringFilter {
    let values = filter.values().map(<[String]>::to_vec).unwrap_or_default();
    match filter_type {
        StringFilterType::IsEqualTo => StringFilter::IsEqualTo { values },
        StringFilterType::IsNotEqualTo => StringFilter::IsNotEqualTo { values },
        StringFilterType::StartsWith => StringFilter::StartsWith { values },
        StringFilterType::DoesNotStartWith => StringFilter::DoesNotStartWith { values },
        StringFilterType::Contains => StringFilter::Contains { values },
        StringFilterType::DoesNotContain => StringFilter::DoesNotContain { values },
        StringFilterType::EndsWith => StringFilter::EndsWith { values },
        StringFilterType::DoesNotEndWith => StringFilter::DoesNotEndWith { values },
        StringFilterType::IsBlank => StringFilter::IsBlank,
        StringFilterType::IsNotBlank => StringFilter::IsNotBlank,
        StringFilterType::IsNull => StringFilter::IsNull,
        StringFilterType::IsNotNull => StringFilter::IsNotNull,
        StringFilterType::Custom => StringFilter::Custom { partial: String::new() },
    }
}

fn matching(field: &str, op: &str, alternator: &str, values: &[String], pattern: impl Fn(&str) -> String) -> String {
    if values.is_empty() {
        return "true".to_string();
    }
    let quoted: Vec<String> = values.iter().map(|v| quote_string(&pattern(v))).collect();
    format!("{} {} {}", field, op, quoted.join(&format!(" {} ", alternator)))
}

fn escape_percents(value: &str) -> String {
    value.replace('%', "%%")
}

/// Single-quoted string literal
pub(crate) fn quote_string(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_equality() {
        let filter = StringFilter::IsEqualTo { values: values(&["CA", "NY"]) };
        assert_eq!(string_filter_code("state", &filter), "state = 'CA' | 'NY'");

        let filter = StringFilter::IsNotEqualTo { values: values(&["CA", "NY"]) };
        assert_eq!(string_filter_code("state", &filter), "state != 'CA' & 'NY'");
    }

    #[test]
    fn test_empty_values_match_everything() {
        let filter = StringFilter::Contains { values: vec![] };
        assert_eq!(string_filter_code("state", &filter), "true");
    }

    #[test]
    fn test_patterns_escape_percents() {
        let filter = StringFilter::Contains { values: values(&["50%"]) };
        assert_eq!(string_filter_code("name", &filter), "name ~ '%50%%%'");

        let filter = StringFilter::DoesNotStartWith { values: values(&["a", "b"]) };
        assert_eq!(string_filter_code("name", &filter), "name !~ 'a%' & 'b%'");

        let filter = StringFilter::EndsWith { values: values(&["z"]) };
        assert_eq!(string_filter_code("name", &filter), "name ~ '%z'");
    }

    #[test]
    fn test_quotes_are_escaped() {
        let filter = StringFilter::IsEqualTo { values: values(&["O'Hare"]) };
        assert_eq!(string_filter_code("airport", &filter), r"airport = 'O\'Hare'");
    }

    #[test]
    fn test_nullary_operators() {
        assert_eq!(string_filter_code("s", &StringFilter::IsBlank), "s = ''");
        assert_eq!(string_filter_code("s", &StringFilter::IsNotNull), "s != null");
        let custom = StringFilter::Custom { partial: "'a' | 'b'".into() };
        assert_eq!(string_filter_code("s", &custom), "s: 'a' | 'b'");
    }

    #[test]
    fn test_change_type_keeps_values() {
        let filter = StringFilter::IsEqualTo { values: values(&["CA"]) };
        let changed = string_filter_change_type(&filter, StringFilterType::Contains);
        assert_eq!(changed, StringFilter::Contains { values: values(&["CA"]) });

        let changed = string_filter_change_type(&StringFilter::IsBlank, StringFilterType::StartsWith);
        assert_eq!(changed, StringFilter::StartsWith { values: vec![] });
        assert_eq!(changed.filter_type(), StringFilterType::StartsWith);
    }

    #[test]
    fn test_deserialize_tagged() {
        let filter: StringFilter = serde_json::from_str(r#"{"type":"starts_with","values":["A"]}"#).unwrap();
        assert_eq!(filter, StringFilter::StartsWith { values: values(&["A"]) });
    }
}
