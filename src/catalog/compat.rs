//! Compatibility matrix between column roles, data types and operations.
//!
//! An operation is legal for a usage when it belongs both to the role's set
//! and to the data type's set. Both tables are total over closed enums.

use std::collections::BTreeSet;

use super::types::{ColumnRole, DataType, Operation};

use Operation as Op;

const AXIS_OPS: &[Operation] = &[Op::None, Op::ByDay, Op::ByWeek, Op::ByMonth, Op::ByYear];

const MEASURE_OPS: &[Operation] = &[Op::Avg, Op::Count, Op::Min, Op::Max, Op::Sum];

const FILTER_OPS: &[Operation] = &[
    Op::Between,
    Op::Equals,
    Op::NotEquals,
    Op::Greater,
    Op::GreaterEqual,
    Op::Lower,
    Op::LowerEqual,
    Op::Like,
    Op::In,
    Op::Fulltext,
    Op::IsNull,
    Op::NotNull,
];

const NUMERIC_OPS: &[Operation] = &[
    Op::None,
    Op::Avg,
    Op::Count,
    Op::Min,
    Op::Max,
    Op::Sum,
    Op::Between,
    Op::Equals,
    Op::NotEquals,
    Op::Greater,
    Op::GreaterEqual,
    Op::Lower,
    Op::LowerEqual,
    Op::In,
    Op::IsNull,
    Op::NotNull,
];

const STRING_OPS: &[Operation] = &[
    Op::None,
    Op::Count,
    Op::Equals,
    Op::NotEquals,
    Op::Like,
    Op::In,
    Op::Fulltext,
    Op::IsNull,
    Op::NotNull,
];

const DATE_OPS: &[Operation] = &[
    Op::None,
    Op::ByDay,
    Op::ByWeek,
    Op::ByMonth,
    Op::ByYear,
    Op::Count,
    Op::Min,
    Op::Max,
    Op::Between,
    Op::Equals,
    Op::NotEquals,
    Op::Greater,
    Op::GreaterEqual,
    Op::Lower,
    Op::LowerEqual,
    Op::IsNull,
    Op::NotNull,
];

const BOOLEAN_OPS: &[Operation] = &[Op::None, Op::Count, Op::Equals, Op::In];

const EXISTENCE_OPS: &[Operation] = &[Op::None, Op::Count, Op::Equals, Op::IsNull, Op::NotNull];

const ENUM_OPS: &[Operation] = &[Op::None, Op::Count, Op::Equals, Op::NotEquals, Op::In];

const TAG_OPS: &[Operation] = &[Op::None, Op::Count, Op::Equals, Op::In];

const ENTITY_OPS: &[Operation] = &[Op::None, Op::Count];

/// Operations a role may carry.
pub fn role_operations(role: ColumnRole) -> &'static [Operation] {
    match role {
        ColumnRole::Axis => AXIS_OPS,
        ColumnRole::Measure => MEASURE_OPS,
        ColumnRole::Filter => FILTER_OPS,
    }
}

/// Operations a data type supports.
pub fn data_type_operations(data_type: DataType) -> &'static [Operation] {
    match data_type {
        DataType::Numeric => NUMERIC_OPS,
        DataType::String => STRING_OPS,
        DataType::Date | DataType::DateAsString => DATE_OPS,
        DataType::Boolean | DataType::BooleanAsString => BOOLEAN_OPS,
        DataType::Existence => EXISTENCE_OPS,
        DataType::List
        | DataType::LevelEnum
        | DataType::ExecutionStatus
        | DataType::RequirementStatus
        | DataType::InfoListItem => ENUM_OPS,
        DataType::Tag => TAG_OPS,
        DataType::Entity => ENTITY_OPS,
    }
}

/// Whether `operation` is legal for a usage in `role` over a `data_type` column.
pub fn is_legal(role: ColumnRole, data_type: DataType, operation: Operation) -> bool {
    role_operations(role).contains(&operation)
        && data_type_operations(data_type).contains(&operation)
}

/// Intersection of the role's and the data type's operations.
pub fn legal_operations(role: ColumnRole, data_type: DataType) -> BTreeSet<Operation> {
    let by_type: BTreeSet<_> = data_type_operations(data_type).iter().copied().collect();
    role_operations(role)
        .iter()
        .copied()
        .filter(|op| by_type.contains(op))
        .collect()
}
