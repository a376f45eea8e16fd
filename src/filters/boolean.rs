use serde::{Deserialize, Serialize};

/// A structured filter on a boolean field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BooleanFilter {
    IsTrue,
    IsFalse,
    IsTrueOrNull,
    IsFalseOrNull,
    IsNull,
    IsNotNull,
    Custom { partial: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BooleanFilterType {
    IsTrue,
    IsFalse,
    IsTrueOrNull,
    IsFalseOrNull,
    IsNull,
    IsNotNull,
    Custom,
}

impl BooleanFilter {
    pub fn filter_type(&self) -> BooleanFilterType {
        match self {
            BooleanFilter::IsTrue => BooleanFilterType::IsTrue,
            BooleanFilter::IsFalse => BooleanFilterType::IsFalse,
            BooleanFilter::IsTrueOrNull => BooleanFilterType::IsTrueOrNull,
            BooleanFilter::IsFalseOrNull => BooleanFilterType::IsFalseOrNull,
            BooleanFilter::IsNull => BooleanFilterType::IsNull,
            BooleanFilter::IsNotNull => BooleanFilterType::IsNotNull,
            BooleanFilter::Custom { .. } => BooleanFilterType::Custom,
        }
    }
}

pub fn boolean_filter_code(field: &str, filter: &BooleanFilter) -> String {
    match filter {
        BooleanFilter::IsTrue => field.to_string(),
        BooleanFilter::IsFalse => format!("not {}", field),
        BooleanFilter::IsTrueOrNull => format!("{}: true | null", field),
        BooleanFilter::IsFalseOrNull => format!("{}: false | null", field),
        BooleanFilter::IsNull => format!("{} = null", field),
        BooleanFilter::IsNotNull => format!("{} != null", field),
        BooleanFilter::Custom { partial } => format!("{}: {}", field, partial),
    }
}

/// Boolean filters carry no operands, so nothing is kept
pub fn boolean_filter_change_type(_filter: &BooleanFilter, filter_type: BooleanFilterType) -> BooleanFilter {
    match filter_type {
        BooleanFilterType::IsTrue => BooleanFilter::IsTrue,
        BooleanFilterType::IsFalse => BooleanFilter::IsFalse,
        BooleanFilterType::IsTrueOrNull => BooleanFilter::IsTrueOrNull,
        BooleanFilterType::IsFalseOrNull => BooleanFilter::IsFalseOrNull,
        BooleanFilterType::IsNull => BooleanFilter::IsNull,
        BooleanFilterType::IsNotNull => BooleanFilter::IsNotNull,
        BooleanFilterType::Custom => BooleanFilter::Custom { partial: String::new() },
    }
}
