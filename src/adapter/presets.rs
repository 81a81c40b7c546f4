//! Built-in search domains with their SQL bindings.

use super::bindings::SqlBindings;
use super::handlers::{ExistsFilter, ExpressionOrder, SharedHandler};
use super::AdapterResult;
use crate::catalog::{DataType, EntityType};
use crate::compiler::SearchDomain;
use crate::mapping::{ColumnMappings, MappingResult};

const TEST_CASE_BINDINGS: &str = include_str!("presets/test_case.toml");
const REQUIREMENT_VERSION_BINDINGS: &str = include_str!("presets/requirement_version.toml");

/// Custom field kinds of one entity, mapped to its extension slots.
fn extensions(prefix: &str) -> MappingResult<ColumnMappings<SharedHandler>> {
    ColumnMappings::builder()
        .map("CF_SINGLE", format!("{}_CUF_TEXT", prefix))
        .map("CF_LIST", format!("{}_CUF_LIST", prefix))
        .map("CF_CHECKBOX", format!("{}_CUF_CHECKBOX", prefix))
        .map("CF_NUMERIC_RANGE", format!("{}_CUF_NUMERIC", prefix))
        .map("CF_TIME_INTERVAL", format!("{}_CUF_DATE", prefix))
        .map("TAGS", format!("{}_CUF_TAG", prefix))
        .build()
}

/// The test case search screen.
pub fn test_case_domain() -> MappingResult<SearchDomain<SharedHandler>> {
    let form = ColumnMappings::builder()
        .map("id", "TEST_CASE_ID")
        .map("name", "TEST_CASE_NAME")
        .map("reference", "TEST_CASE_REFERENCE")
        .map("description", "TEST_CASE_DESCRIPTION")
        .map("prerequisite", "TEST_CASE_PREREQUISITE")
        .map("importance", "TEST_CASE_IMPORTANCE")
        .map("status", "TEST_CASE_STATUS")
        .map("automatable", "TEST_CASE_AUTOMATABLE")
        .map("nature", "TEST_CASE_NATURE")
        .map("type", "TEST_CASE_TYPE")
        .map("kind", "TEST_CASE_KIND")
        .map("createdBy", "TEST_CASE_CREATED_BY")
        .map("createdOn", "TEST_CASE_CREATED_ON")
        .map("modifiedBy", "TEST_CASE_MODIFIED_BY")
        .map("modifiedOn", "TEST_CASE_MODIFIED_ON")
        .map("steps", "TEST_CASE_STEPCOUNT")
        .map("requirements", "TEST_CASE_REQCOUNT")
        .map("iterations", "TEST_CASE_ITERCOUNT")
        .map("attachments", "TEST_CASE_ATTACHMENTS")
        .map("project.id", "TEST_CASE_PROJECT_ID")
        .map("project.name", "TEST_CASE_PROJECT_NAME")
        .map("milestone.label", "TEST_CASE_MILESTONE_LABEL")
        .map("milestone.status", "TEST_CASE_MILESTONE_STATUS")
        .map("milestone.endDate", "TEST_CASE_MILESTONE_END_DATE")
        .map_handler(
            "milestones",
            ExistsFilter::new("milestone_test_case", "test_case_id", "milestone_id")
                .with_value_type(DataType::Numeric)
                .shared(),
        )
        .build()?;

    let result = ColumnMappings::builder()
        .map("id", "TEST_CASE_ID")
        .map("name", "TEST_CASE_NAME")
        .map("reference", "TEST_CASE_REFERENCE")
        .map("importance", "TEST_CASE_IMPORTANCE")
        .map("status", "TEST_CASE_STATUS")
        .map("nature", "TEST_CASE_NATURE")
        .map("type", "TEST_CASE_TYPE")
        .map("project-name", "TEST_CASE_PROJECT_NAME")
        .map("createdBy", "TEST_CASE_CREATED_BY")
        .map("created", "TEST_CASE_CREATED_ON")
        .map("modified", "TEST_CASE_MODIFIED_ON")
        .map("steps", "TEST_CASE_STEPCOUNT")
        .map("requirements", "TEST_CASE_REQCOUNT")
        .map("attachments", "TEST_CASE_ATTACHMENTS")
        .map_handler(
            "path",
            ExpressionOrder::new(
                "(SELECT p.path FROM test_case_path p WHERE p.tcln_id = {alias}.tcln_id)",
            )
            .shared(),
        )
        .build()?;

    Ok(SearchDomain {
        root: EntityType::TestCase,
        form,
        result,
        extensions: extensions("TEST_CASE")?,
    })
}

/// The requirement search screen; one row per requirement version.
pub fn requirement_version_domain() -> MappingResult<SearchDomain<SharedHandler>> {
    let form = ColumnMappings::builder()
        .map("id", "REQUIREMENT_VERSION_ID")
        .map("requirement.id", "REQUIREMENT_ID")
        .map("name", "REQUIREMENT_VERSION_NAME")
        .map("reference", "REQUIREMENT_VERSION_REFERENCE")
        .map("description", "REQUIREMENT_VERSION_DESCRIPTION")
        .map("criticality", "REQUIREMENT_VERSION_CRITICALITY")
        .map("status", "REQUIREMENT_VERSION_STATUS")
        .map("category", "REQUIREMENT_VERSION_CATEGORY")
        .map("versionNumber", "REQUIREMENT_VERSION_VERS_NUM")
        .map("versions", "REQUIREMENT_NB_VERSIONS")
        .map("createdBy", "REQUIREMENT_VERSION_CREATED_BY")
        .map("createdOn", "REQUIREMENT_VERSION_CREATED_ON")
        .map("modifiedOn", "REQUIREMENT_VERSION_MODIFIED_ON")
        .map("testcases", "REQUIREMENT_VERSION_TCCOUNT")
        .map("attachments", "REQUIREMENT_VERSION_ATTACHMENTS")
        .map("project.id", "REQUIREMENT_PROJECT_ID")
        .map("project.name", "REQUIREMENT_PROJECT_NAME")
        .map("milestone.label", "REQUIREMENT_VERSION_MILESTONE_LABEL")
        .map("milestone.endDate", "REQUIREMENT_VERSION_MILESTONE_END_DATE")
        .map_handler(
            "milestones",
            ExistsFilter::new("milestone_req_version", "req_version_id", "milestone_id")
                .with_value_type(DataType::Numeric)
                .shared(),
        )
        .build()?;

    let result = ColumnMappings::builder()
        .map("id", "REQUIREMENT_VERSION_ID")
        .map("name", "REQUIREMENT_VERSION_NAME")
        .map("reference", "REQUIREMENT_VERSION_REFERENCE")
        .map("criticality", "REQUIREMENT_VERSION_CRITICALITY")
        .map("status", "REQUIREMENT_VERSION_STATUS")
        .map("category", "REQUIREMENT_VERSION_CATEGORY")
        .map("project-name", "REQUIREMENT_PROJECT_NAME")
        .map("versionNumber", "REQUIREMENT_VERSION_VERS_NUM")
        .map("versions", "REQUIREMENT_NB_VERSIONS")
        .map("created", "REQUIREMENT_VERSION_CREATED_ON")
        .map("modified", "REQUIREMENT_VERSION_MODIFIED_ON")
        .map("testcases", "REQUIREMENT_VERSION_TCCOUNT")
        .build()?;

    Ok(SearchDomain {
        root: EntityType::RequirementVersion,
        form,
        result,
        extensions: extensions("REQUIREMENT_VERSION")?,
    })
}

pub fn test_case_bindings() -> AdapterResult<SqlBindings> {
    SqlBindings::from_toml_str(TEST_CASE_BINDINGS)
}

pub fn requirement_version_bindings() -> AdapterResult<SqlBindings> {
    SqlBindings::from_toml_str(REQUIREMENT_VERSION_BINDINGS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, ColumnType};

    /// Every attribute and calculated column a domain names must be bound.
    fn assert_covered(domain: &SearchDomain<SharedHandler>, bindings: &SqlBindings) {
        let catalog = Catalog::builtin();
        let labels = domain
            .form
            .labels()
            .values()
            .chain(domain.result.labels().values());

        for label in labels {
            let prototype = catalog.lookup(label).unwrap();
            let alias = prototype.specialized_type.alias();
            bindings.join_chain(&alias).unwrap();
            match prototype.column_type {
                ColumnType::Attribute => {
                    let attribute = prototype.attribute_name.as_deref().unwrap();
                    bindings.column(&alias, attribute).unwrap();
                }
                ColumnType::Calculated => assert!(bindings.calculated.contains_key(label), "{label}"),
                ColumnType::Entity | ColumnType::Extension => {}
            }
        }

        for label in domain.extensions.labels().values() {
            assert!(catalog.lookup(label).unwrap().is_extension());
        }
        assert!(bindings.custom_fields().is_ok());
    }

    #[test]
    fn test_test_case_preset_is_bound() {
        let domain = test_case_domain().unwrap();
        let bindings = test_case_bindings().unwrap();
        assert_eq!(bindings.root, domain.root.as_str().to_lowercase());
        assert_covered(&domain, &bindings);
    }

    #[test]
    fn test_requirement_version_preset_is_bound() {
        let domain = requirement_version_domain().unwrap();
        let bindings = requirement_version_bindings().unwrap();
        assert_eq!(bindings.root, domain.root.as_str().to_lowercase());
        assert_covered(&domain, &bindings);
        assert_eq!(
            bindings.join_chain("project@requirement_project").unwrap(),
            vec!["requirement", "project@requirement_project"]
        );
    }
}
