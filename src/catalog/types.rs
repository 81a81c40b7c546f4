//! Closed vocabularies of the catalog: entities, roles, data types, operations.
//!
//! Every enum here serializes in `SCREAMING_SNAKE_CASE`, which is the form
//! used in catalog files, wire models and mapping tables.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Coarse business entity kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityType {
    TestCase,
    Requirement,
    RequirementVersion,
    Campaign,
    Iteration,
    Execution,
    Project,
    Milestone,
    InfoListItem,
}

impl EntityType {
    pub const ALL: [EntityType; 9] = [
        EntityType::TestCase,
        EntityType::Requirement,
        EntityType::RequirementVersion,
        EntityType::Campaign,
        EntityType::Iteration,
        EntityType::Execution,
        EntityType::Project,
        EntityType::Milestone,
        EntityType::InfoListItem,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::TestCase => "TEST_CASE",
            EntityType::Requirement => "REQUIREMENT",
            EntityType::RequirementVersion => "REQUIREMENT_VERSION",
            EntityType::Campaign => "CAMPAIGN",
            EntityType::Iteration => "ITERATION",
            EntityType::Execution => "EXECUTION",
            EntityType::Project => "PROJECT",
            EntityType::Milestone => "MILESTONE",
            EntityType::InfoListItem => "INFO_LIST_ITEM",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|e| e.as_str().eq_ignore_ascii_case(s))
    }

    /// Label of the prototype standing for the whole record.
    ///
    /// Search domains rooted at this entity always project it first.
    pub fn entity_label(&self) -> String {
        format!("{}_ENTITY", self.as_str())
    }

    /// Label of the identifier attribute of this entity.
    pub fn id_label(&self) -> String {
        format!("{}_ID", self.as_str())
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Disambiguates several appearances of one entity kind in a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityRole {
    TestCaseProject,
    RequirementProject,
    TestCaseMilestone,
    RequirementVersionMilestone,
    TestCaseNature,
    TestCaseType,
    RequirementVersionCategory,
}

impl EntityRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityRole::TestCaseProject => "TEST_CASE_PROJECT",
            EntityRole::RequirementProject => "REQUIREMENT_PROJECT",
            EntityRole::TestCaseMilestone => "TEST_CASE_MILESTONE",
            EntityRole::RequirementVersionMilestone => "REQUIREMENT_VERSION_MILESTONE",
            EntityRole::TestCaseNature => "TEST_CASE_NATURE",
            EntityRole::TestCaseType => "TEST_CASE_TYPE",
            EntityRole::RequirementVersionCategory => "REQUIREMENT_VERSION_CATEGORY",
        }
    }
}

/// An entity kind paired with the role it plays in a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SpecializedEntityType {
    pub entity_type: EntityType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<EntityRole>,
}

impl SpecializedEntityType {
    pub fn new(entity_type: EntityType) -> Self {
        Self {
            entity_type,
            role: None,
        }
    }

    pub fn with_role(entity_type: EntityType, role: EntityRole) -> Self {
        Self {
            entity_type,
            role: Some(role),
        }
    }

    /// Stable, lowercase key naming this appearance, e.g. `project@test_case_project`.
    ///
    /// Used by SQL bindings as the table alias.
    pub fn alias(&self) -> String {
        match self.role {
            Some(role) => format!(
                "{}@{}",
                self.entity_type.as_str().to_lowercase(),
                role.as_str().to_lowercase()
            ),
            None => self.entity_type.as_str().to_lowercase(),
        }
    }
}

impl fmt::Display for SpecializedEntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.role {
            Some(role) => write!(f, "{}[{}]", self.entity_type, role.as_str()),
            None => write!(f, "{}", self.entity_type),
        }
    }
}

/// What a prototype stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ColumnType {
    /// A stored value.
    Attribute,
    /// Derived, typically through a sub-query.
    Calculated,
    /// The whole record.
    Entity,
    /// A user-defined field of the prototype's data type; identity travels
    /// on the usage as a custom field id.
    Extension,
}

/// Purpose a column serves in one query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ColumnRole {
    Axis,
    Measure,
    Filter,
}

impl ColumnRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnRole::Axis => "AXIS",
            ColumnRole::Measure => "MEASURE",
            ColumnRole::Filter => "FILTER",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "AXIS" => Some(ColumnRole::Axis),
            "MEASURE" => Some(ColumnRole::Measure),
            "FILTER" => Some(ColumnRole::Filter),
            _ => None,
        }
    }
}

impl fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logical data type of a prototype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataType {
    Numeric,
    String,
    Date,
    /// A calendar date stored as a `yyyy-MM-dd` string (custom fields).
    DateAsString,
    Boolean,
    /// `"true"` / `"false"` stored as text (custom checkboxes).
    BooleanAsString,
    Existence,
    List,
    LevelEnum,
    ExecutionStatus,
    RequirementStatus,
    InfoListItem,
    Tag,
    Entity,
}

impl DataType {
    pub const ALL: [DataType; 14] = [
        DataType::Numeric,
        DataType::String,
        DataType::Date,
        DataType::DateAsString,
        DataType::Boolean,
        DataType::BooleanAsString,
        DataType::Existence,
        DataType::List,
        DataType::LevelEnum,
        DataType::ExecutionStatus,
        DataType::RequirementStatus,
        DataType::InfoListItem,
        DataType::Tag,
        DataType::Entity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Numeric => "NUMERIC",
            DataType::String => "STRING",
            DataType::Date => "DATE",
            DataType::DateAsString => "DATE_AS_STRING",
            DataType::Boolean => "BOOLEAN",
            DataType::BooleanAsString => "BOOLEAN_AS_STRING",
            DataType::Existence => "EXISTENCE",
            DataType::List => "LIST",
            DataType::LevelEnum => "LEVEL_ENUM",
            DataType::ExecutionStatus => "EXECUTION_STATUS",
            DataType::RequirementStatus => "REQUIREMENT_STATUS",
            DataType::InfoListItem => "INFO_LIST_ITEM",
            DataType::Tag => "TAG",
            DataType::Entity => "ENTITY",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s))
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every operation a column usage may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operation {
    None,
    // Measures
    Avg,
    Count,
    Min,
    Max,
    Sum,
    // Axis bucketing
    ByDay,
    ByWeek,
    ByMonth,
    ByYear,
    // Filters
    Between,
    Equals,
    NotEquals,
    Greater,
    GreaterEqual,
    Lower,
    LowerEqual,
    Like,
    In,
    Fulltext,
    IsNull,
    NotNull,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::None => "NONE",
            Operation::Avg => "AVG",
            Operation::Count => "COUNT",
            Operation::Min => "MIN",
            Operation::Max => "MAX",
            Operation::Sum => "SUM",
            Operation::ByDay => "BY_DAY",
            Operation::ByWeek => "BY_WEEK",
            Operation::ByMonth => "BY_MONTH",
            Operation::ByYear => "BY_YEAR",
            Operation::Between => "BETWEEN",
            Operation::Equals => "EQUALS",
            Operation::NotEquals => "NOT_EQUALS",
            Operation::Greater => "GREATER",
            Operation::GreaterEqual => "GREATER_EQUAL",
            Operation::Lower => "LOWER",
            Operation::LowerEqual => "LOWER_EQUAL",
            Operation::Like => "LIKE",
            Operation::In => "IN",
            Operation::Fulltext => "FULLTEXT",
            Operation::IsNull => "IS_NULL",
            Operation::NotNull => "NOT_NULL",
        }
    }

    /// Aggregate functions, legal only for measures.
    pub fn is_aggregate(&self) -> bool {
        matches!(
            self,
            Operation::Avg | Operation::Count | Operation::Min | Operation::Max | Operation::Sum
        )
    }

    /// Number of literal values a filter with this operation consumes.
    ///
    /// `None` means any count (IN); an empty IN matches no row.
    pub fn arity(&self) -> Option<usize> {
        match self {
            Operation::Between => Some(2),
            Operation::IsNull | Operation::NotNull => Some(0),
            Operation::In => None,
            _ => Some(1),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort direction of an ordering usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Some(SortDirection::Asc),
            "desc" => Some(SortDirection::Desc),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_labels() {
        assert_eq!(EntityType::TestCase.entity_label(), "TEST_CASE_ENTITY");
        assert_eq!(EntityType::RequirementVersion.id_label(), "REQUIREMENT_VERSION_ID");
    }

    #[test]
    fn test_specialized_alias() {
        let plain = SpecializedEntityType::new(EntityType::TestCase);
        assert_eq!(plain.alias(), "test_case");

        let project = SpecializedEntityType::with_role(EntityType::Project, EntityRole::TestCaseProject);
        assert_eq!(project.alias(), "project@test_case_project");
        assert_eq!(project.to_string(), "PROJECT[TEST_CASE_PROJECT]");
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&DataType::DateAsString).unwrap();
        assert_eq!(json, "\"DATE_AS_STRING\"");
        let op: Operation = serde_json::from_str("\"GREATER_EQUAL\"").unwrap();
        assert_eq!(op, Operation::GreaterEqual);
    }

    #[test]
    fn test_from_str_is_case_insensitive() {
        assert_eq!(DataType::from_str("numeric"), Some(DataType::Numeric));
        assert_eq!(ColumnRole::from_str("Filter"), Some(ColumnRole::Filter));
        assert_eq!(EntityType::from_str("test_case"), Some(EntityType::TestCase));
        assert_eq!(EntityType::from_str("nope"), None);
    }

    #[test]
    fn test_operation_arity() {
        assert_eq!(Operation::Between.arity(), Some(2));
        assert_eq!(Operation::Like.arity(), Some(1));
        assert_eq!(Operation::IsNull.arity(), Some(0));
        assert_eq!(Operation::In.arity(), None);
    }
}
