use serde::{Deserialize, Serialize};

/// A structured filter on a number field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NumberFilter {
    IsEqualTo { values: Vec<f64> },
    IsNotEqualTo { values: Vec<f64> },
    IsGreaterThan { value: f64 },
    IsLessThan { value: f64 },
    IsGreaterThanOrEqualTo { value: f64 },
    IsLessThanOrEqualTo { value: f64 },
    IsBetween { lower_bound: f64, upper_bound: f64 },
    IsNull,
    IsNotNull,
    Custom { partial: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumberFilterType {
    IsEqualTo,
    IsNotEqualTo,
    IsGreaterThan,
    IsLessThan,
    IsGreaterThanOrEqualTo,
    IsLessThanOrEqualTo,
    IsBetween,
    IsNull,
    IsNotNull,
    Custom,
}

impl NumberFilter {
    pub fn filter_type(&self) -> NumberFilterType {
        match self {
            NumberFilter::IsEqualTo { .. } => NumberFilterType::IsEqualTo,
            NumberFilter::IsNotEqualTo { .. } => NumberFilterType::IsNotEqualTo,
            NumberFilter::IsGreaterThan { .. } => NumberFilterType::IsGreaterThan,
            NumberFilter::IsLessThan { .. } => NumberFilterType::IsLessThan,
            NumberFilter::IsGreaterThanOrEqualTo { .. } => NumberFilterType::IsGreaterThanOrEqualTo,
            NumberFilter::IsLessThanOrEqualTo { .. } => NumberFilterType::IsLessThanOrEqualTo,
            NumberFilter::IsBetween { .. } => NumberFilterType::IsBetween,
            NumberFilter::IsNull => NumberFilterType::IsNull,
            NumberFilter::IsNotNull => NumberFilterType::IsNotNull,
            NumberFilter::Custom { .. } => NumberFilterType::Custom,
        }
    }

    /// The single comparison operand, if the filter has one
    fn single_value(&self) -> Option<f64> {
        match self {
            NumberFilter::IsGreaterThan { value }
            | NumberFilter::IsLessThan { value }
            | NumberFilter::IsGreaterThanOrEqualTo { value }
            | NumberFilter::IsLessThanOrEqualTo { value } => Some(*value),
            _ => None,
        }
    }
}

pub fn number_filter_code(field: &str, filter: &NumberFilter) -> String {
    match filter {
        NumberFilter::IsEqualTo { values } => alternation(field, "=", "|", values),
        NumberFilter::IsNotEqualTo { values } => alternation(field, "!=", "&", values),
        NumberFilter::IsGreaterThan { value } => format!("{} > {}", field, value),
        NumberFilter::IsLessThan { value } => format!("{} < {}", field, value),
        NumberFilter::IsGreaterThanOrEqualTo { value } => format!("{} >= {}", field, value),
        NumberFilter::IsLessThanOrEqualTo { value } => format!("{} <= {}", field, value),
        NumberFilter::IsBetween { lower_bound, upper_bound } => {
            format!("{}: {} to {}", field, lower_bound, upper_bound)
        }
        NumberFilter::IsNull => format!("{} = null", field),
        NumberFilter::IsNotNull => format!("{} != null", field),
        NumberFilter::Custom { partial } => format!("{}: {}", field, partial),
    }
}

/// Switch operator, carrying operands over where they fit
///
/// Lists take the single operand or the lower bound; single operands and
/// lower bounds take the first list entry; anything missing becomes zero.
pub fn number_filter_change_type(filter: &NumberFilter, filter_type: NumberFilterType) -> NumberFilter {
    let first = match filter {
        NumberFilter::IsEqualTo { values } | NumberFilter::IsNotEqualTo { values } => values.first().copied(),
        NumberFilter::IsBetween { lower_bound, .. } => Some(*lower_bound),
        other => other.single_value(),
    };
    let values = match filter {
        NumberFilter::IsEqualTo { values } | NumberFilter::IsNotEqualTo { values } => values.clone(),
        _ => first.into_iter().collect(),
    };
    let value = match filter {
        NumberFilter::IsBetween { .. } => 0.0,
        _ => first.unwrap_or(0.0),
    };

    match filter_type {
        NumberFilterType::IsEqualTo => NumberFilter::IsEqualTo { values },
        NumberFilterType::IsNotEqualTo => NumberFilter::IsNotEqualTo { values },
        NumberFilterType::IsGreaterThan => NumberFilter::IsGreaterThan { value },
        NumberFilterType::IsLessThan => NumberFilter::IsLessThan { value },
        NumberFilterType::IsGreaterThanOrEqualTo => NumberFilter::IsGreaterThanOrEqualTo { value },
        NumberFilterType::IsLessThanOrEqualTo => NumberFilter::IsLessThanOrEqualTo { value },
        NumberFilterType::IsBetween => NumberFilter::IsBetween {
            lower_bound: value,
            upper_bound: 0.0,
        },
        NumberFilterType::IsNull => NumberFilter::IsNull,
        NumberFilterType::IsNotNull => NumberFilter::IsNotNull,
        NumberFilterType::Custom => NumberFilter::Custom { partial: String::new() },
    }
}

fn alternation(field: &str, op: &str, alternator: &str, values: &[f64]) -> String {
    if values.is_empty() {
        return "true".to_string();
    }
    let terms: Vec<String> = values.iter().map(f64::to_string).collect();
    format!("{} {} {}", field, op, terms.join(&format!(" {} ", alternator)))
}
