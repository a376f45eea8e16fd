//! Structured filters (verb module)
//!
//! A UI edits filters as structured values (operator plus operands); these
//! are turned into filter code before being handed to the builder.

mod boolean;
mod number;
mod string;
mod time;

pub use boolean::{boolean_filter_change_type, boolean_filter_code, BooleanFilter, BooleanFilterType};
pub use number::{number_filter_change_type, number_filter_code, NumberFilter, NumberFilterType};
pub use string::{string_filter_change_type, string_filter_code, StringFilter, StringFilterType};
pub use time::{
    time_filter_change_type, time_filter_code, time_literal, PastUnit, TimeFilter, TimeFilterType,
    TimeGranularity,
};

use serde::{Deserialize, Serialize};
use crate::pipeline::FilterExpression;
use crate::schema::FieldType;

/// A structured filter for a field of any scalar type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field_type", content = "filter", rename_all = "snake_case")]
pub enum StructuredFilter {
    String(StringFilter),
    Number(NumberFilter),
    Boolean(BooleanFilter),
    Time(TimeFilter),
}

impl StructuredFilter {
    /// The filter a newly added filter on a field of `field_type` starts as
    pub fn default_for(field_type: FieldType) -> Self {
        match field_type {
            FieldType::String => StructuredFilter::String(StringFilter::IsEqualTo { values: Vec::new() }),
            FieldType::Number => StructuredFilter::Number(NumberFilter::IsEqualTo { values: Vec::new() }),
            FieldType::Boolean => StructuredFilter::Boolean(BooleanFilter::IsTrue),
            FieldType::Date | FieldType::Timestamp => StructuredFilter::Time(TimeFilter::IsLast {
                period: TimeGranularity::Day,
            }),
        }
    }

    /// Filter code for `field`
    pub fn code(&self, field: &str) -> String {
        match self {
            StructuredFilter::String(filter) => string_filter_code(field, filter),
            StructuredFilter::Number(filter) => number_filter_code(field, filter),
            StructuredFilter::Boolean(filter) => boolean_filter_code(field, filter),
            StructuredFilter::Time(filter) => time_filter_code(field, filter),
        }
    }

    /// Stage or field filter ready for the builder
    pub fn to_expression(&self, field: &str) -> FilterExpression {
        FilterExpression::new(self.code(field))
    }
}
