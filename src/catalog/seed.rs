//! Built-in column prototypes for the test-management entities.

use std::collections::BTreeSet;

use super::prototype::ColumnPrototype;
use super::types::ColumnRole::{self, Axis, Filter, Measure};
use super::types::{ColumnType, DataType, EntityRole, EntityType, SpecializedEntityType};

const ALL_ROLES: &[ColumnRole] = &[Axis, Measure, Filter];
const AXIS_FILTER: &[ColumnRole] = &[Axis, Filter];
const FILTER_ONLY: &[ColumnRole] = &[Filter];
const ENTITY_ROLES: &[ColumnRole] = &[Axis, Measure];

struct Seed {
    next_id: u32,
    columns: Vec<ColumnPrototype>,
}

impl Seed {
    fn push(
        &mut self,
        label: &str,
        column_type: ColumnType,
        on: SpecializedEntityType,
        data_type: DataType,
        roles: &[ColumnRole],
        attribute: Option<&str>,
        business: bool,
    ) -> &mut Self {
        self.next_id += 1;
        self.columns.push(ColumnPrototype {
            id: self.next_id,
            label: label.into(),
            column_type,
            specialized_type: on,
            data_type,
            roles: roles.iter().copied().collect::<BTreeSet<_>>(),
            attribute_name: attribute.map(String::from),
            business,
        });
        self
    }

    fn entity(&mut self, on: EntityType) -> &mut Self {
        let label = on.entity_label();
        self.push(
            &label,
            ColumnType::Entity,
            SpecializedEntityType::new(on),
            DataType::Entity,
            ENTITY_ROLES,
            None,
            false,
        )
    }

    fn attr(
        &mut self,
        label: &str,
        on: SpecializedEntityType,
        data_type: DataType,
        roles: &[ColumnRole],
        attribute: &str,
    ) -> &mut Self {
        self.push(label, ColumnType::Attribute, on, data_type, roles, Some(attribute), true)
    }

    fn calc(&mut self, label: &str, on: SpecializedEntityType, attribute: &str) -> &mut Self {
        self.push(
            label,
            ColumnType::Calculated,
            on,
            DataType::Numeric,
            ALL_ROLES,
            Some(attribute),
            true,
        )
    }

    /// One extension slot per custom field data type.
    fn custom_fields(&mut self, prefix: &str, on: EntityType) -> &mut Self {
        let on = SpecializedEntityType::new(on);
        for (suffix, data_type, roles) in [
            ("CUF_TEXT", DataType::String, AXIS_FILTER),
            ("CUF_LIST", DataType::List, AXIS_FILTER),
            ("CUF_TAG", DataType::Tag, AXIS_FILTER),
            ("CUF_NUMERIC", DataType::Numeric, ALL_ROLES),
            ("CUF_DATE", DataType::DateAsString, AXIS_FILTER),
            ("CUF_CHECKBOX", DataType::BooleanAsString, AXIS_FILTER),
        ] {
            self.push(
                &format!("{}_{}", prefix, suffix),
                ColumnType::Extension,
                on,
                data_type,
                roles,
                Some("value"),
                true,
            );
        }
        self
    }
}

/// The prototypes loaded by [`super::Catalog::builtin`].
pub fn prototypes() -> Vec<ColumnPrototype> {
    use DataType::*;

    let tc = SpecializedEntityType::new(EntityType::TestCase);
    let tc_project = SpecializedEntityType::with_role(EntityType::Project, EntityRole::TestCaseProject);
    let tc_milestone =
        SpecializedEntityType::with_role(EntityType::Milestone, EntityRole::TestCaseMilestone);
    let tc_nature =
        SpecializedEntityType::with_role(EntityType::InfoListItem, EntityRole::TestCaseNature);
    let tc_type = SpecializedEntityType::with_role(EntityType::InfoListItem, EntityRole::TestCaseType);

    let rv = SpecializedEntityType::new(EntityType::RequirementVersion);
    let req = SpecializedEntityType::new(EntityType::Requirement);
    let req_project =
        SpecializedEntityType::with_role(EntityType::Project, EntityRole::RequirementProject);
    let rv_milestone = SpecializedEntityType::with_role(
        EntityType::Milestone,
        EntityRole::RequirementVersionMilestone,
    );
    let rv_category = SpecializedEntityType::with_role(
        EntityType::InfoListItem,
        EntityRole::RequirementVersionCategory,
    );

    let campaign = SpecializedEntityType::new(EntityType::Campaign);
    let iteration = SpecializedEntityType::new(EntityType::Iteration);
    let execution = SpecializedEntityType::new(EntityType::Execution);

    let mut seed = Seed {
        next_id: 0,
        columns: Vec::new(),
    };

    // Test cases
    seed.entity(EntityType::TestCase)
        .attr("TEST_CASE_ID", tc, Numeric, ALL_ROLES, "id")
        .attr("TEST_CASE_REFERENCE", tc, String, AXIS_FILTER, "reference")
        .attr("TEST_CASE_NAME", tc, String, AXIS_FILTER, "name")
        .attr("TEST_CASE_DESCRIPTION", tc, String, FILTER_ONLY, "description")
        .attr("TEST_CASE_PREREQUISITE", tc, String, FILTER_ONLY, "prerequisite")
        .attr("TEST_CASE_IMPORTANCE", tc, LevelEnum, AXIS_FILTER, "importance")
        .attr("TEST_CASE_STATUS", tc, LevelEnum, AXIS_FILTER, "status")
        .attr("TEST_CASE_AUTOMATABLE", tc, LevelEnum, AXIS_FILTER, "automatable")
        .attr("TEST_CASE_KIND", tc, List, AXIS_FILTER, "kind")
        .attr("TEST_CASE_CREATED_BY", tc, String, AXIS_FILTER, "createdBy")
        .attr("TEST_CASE_CREATED_ON", tc, Date, ALL_ROLES, "createdOn")
        .attr("TEST_CASE_MODIFIED_BY", tc, String, AXIS_FILTER, "lastModifiedBy")
        .attr("TEST_CASE_MODIFIED_ON", tc, Date, ALL_ROLES, "lastModifiedOn")
        .attr("TEST_CASE_HASAUTOSCRIPT", tc, Existence, FILTER_ONLY, "automatedTest")
        .calc("TEST_CASE_STEPCOUNT", tc, "steps")
        .calc("TEST_CASE_REQCOUNT", tc, "requirementVersionCoverages")
        .calc("TEST_CASE_ITERCOUNT", tc, "iterations")
        .calc("TEST_CASE_ATTACHMENTS", tc, "attachments")
        .attr("TEST_CASE_NATURE", tc_nature, InfoListItem, AXIS_FILTER, "code")
        .attr("TEST_CASE_TYPE", tc_type, InfoListItem, AXIS_FILTER, "code")
        .attr("TEST_CASE_PROJECT_ID", tc_project, Numeric, AXIS_FILTER, "id")
        .attr("TEST_CASE_PROJECT_NAME", tc_project, String, AXIS_FILTER, "name")
        .attr("TEST_CASE_MILESTONE_LABEL", tc_milestone, String, AXIS_FILTER, "label")
        .attr("TEST_CASE_MILESTONE_STATUS", tc_milestone, List, AXIS_FILTER, "status")
        .attr("TEST_CASE_MILESTONE_END_DATE", tc_milestone, Date, AXIS_FILTER, "endDate")
        .custom_fields("TEST_CASE", EntityType::TestCase);

    // Requirement versions and their requirement
    seed.entity(EntityType::RequirementVersion)
        .attr("REQUIREMENT_VERSION_ID", rv, Numeric, ALL_ROLES, "id")
        .attr("REQUIREMENT_VERSION_REFERENCE", rv, String, AXIS_FILTER, "reference")
        .attr("REQUIREMENT_VERSION_NAME", rv, String, AXIS_FILTER, "name")
        .attr("REQUIREMENT_VERSION_DESCRIPTION", rv, String, FILTER_ONLY, "description")
        .attr("REQUIREMENT_VERSION_CRITICALITY", rv, LevelEnum, AXIS_FILTER, "criticality")
        .attr("REQUIREMENT_VERSION_STATUS", rv, RequirementStatus, AXIS_FILTER, "status")
        .attr("REQUIREMENT_VERSION_VERS_NUM", rv, Numeric, ALL_ROLES, "versionNumber")
        .attr("REQUIREMENT_VERSION_CREATED_BY", rv, String, AXIS_FILTER, "createdBy")
        .attr("REQUIREMENT_VERSION_CREATED_ON", rv, Date, ALL_ROLES, "createdOn")
        .attr("REQUIREMENT_VERSION_MODIFIED_ON", rv, Date, ALL_ROLES, "lastModifiedOn")
        .calc("REQUIREMENT_VERSION_TCCOUNT", rv, "requirementVersionCoverages")
        .calc("REQUIREMENT_VERSION_ATTACHMENTS", rv, "attachments")
        .attr("REQUIREMENT_VERSION_CATEGORY", rv_category, InfoListItem, AXIS_FILTER, "code")
        .attr("REQUIREMENT_ID", req, Numeric, ALL_ROLES, "id")
        .calc("REQUIREMENT_NB_VERSIONS", req, "versions")
        .attr("REQUIREMENT_PROJECT_ID", req_project, Numeric, AXIS_FILTER, "id")
        .attr("REQUIREMENT_PROJECT_NAME", req_project, String, AXIS_FILTER, "name")
        .attr("REQUIREMENT_VERSION_MILESTONE_LABEL", rv_milestone, String, AXIS_FILTER, "label")
        .attr("REQUIREMENT_VERSION_MILESTONE_END_DATE", rv_milestone, Date, AXIS_FILTER, "endDate")
        .custom_fields("REQUIREMENT_VERSION", EntityType::RequirementVersion);

    // Campaign workspace
    seed.entity(EntityType::Campaign)
        .attr("CAMPAIGN_ID", campaign, Numeric, ALL_ROLES, "id")
        .attr("CAMPAIGN_NAME", campaign, String, AXIS_FILTER, "name")
        .attr("CAMPAIGN_SCHED_START", campaign, Date, ALL_ROLES, "scheduledStartDate")
        .attr("CAMPAIGN_SCHED_END", campaign, Date, ALL_ROLES, "scheduledEndDate")
        .entity(EntityType::Iteration)
        .attr("ITERATION_ID", iteration, Numeric, ALL_ROLES, "id")
        .attr("ITERATION_NAME", iteration, String, AXIS_FILTER, "name")
        .entity(EntityType::Execution)
        .attr("EXECUTION_ID", execution, Numeric, ALL_ROLES, "id")
        .attr("EXECUTION_STATUS", execution, ExecutionStatus, AXIS_FILTER, "executionStatus")
        .attr("EXECUTION_LASTEXEC", execution, Date, ALL_ROLES, "lastExecutedOn")
        .attr("EXECUTION_ISAUTO", execution, Boolean, AXIS_FILTER, "automated");

    seed.columns
}
