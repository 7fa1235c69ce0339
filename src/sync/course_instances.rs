use std::collections::BTreeMap;

use tracing::debug;

use super::identity::{check_catalog_uuids, check_uuid_unique};
use super::order::compare_numbered;
use crate::db::{
    CourseInstanceAccessRuleParams, CourseInstanceParams, CourseStore, Positional, PruneScope,
    UuidScope,
};
use crate::error::SyncError;
use crate::loader::CourseInstanceTree;
use crate::loader::validate::normalize_rule_date;
use crate::models::{CourseInstanceInfo, UserRole};

/// Upserts course instances with their access rules. Returns ids by ciid.
pub async fn sync_course_instances(
    store: &mut dyn CourseStore,
    course_id: i64,
    instances: &BTreeMap<String, CourseInstanceTree>,
    course_timezone: Option<&str>,
) -> Result<BTreeMap<String, i64>, SyncError> {
    check_catalog_uuids(
        "course instances",
        instances
            .iter()
            .map(|(ciid, ci)| (ciid.as_str(), ci.info.uuid.as_str())),
    )?;

    let mut ordered: Vec<(&String, &CourseInstanceInfo)> =
        instances.iter().map(|(ciid, ci)| (ciid, &ci.info)).collect();
    ordered.sort_by(|(a_id, a), (b_id, b)| {
        compare_numbered(a.number.as_deref(), a_id, b.number.as_deref(), b_id)
    });

    let scope = UuidScope::CourseInstance { course_id };
    for (ciid, info) in &ordered {
        check_uuid_unique(store, &scope, "course instances", ciid, &info.uuid).await?;
    }

    let mut ids = BTreeMap::new();
    for (position, (ciid, info)) in ordered.into_iter().enumerate() {
        let params = CourseInstanceParams {
            uuid: &info.uuid,
            short_name: ciid,
            long_name: &info.long_name,
            number: info.number.as_deref(),
            order_by: position as i64 + 1,
            display_timezone: info.timezone.as_deref().or(course_timezone),
            hide_in_enroll_page: info.hide_in_enroll_page,
        };
        let id = store.upsert_course_instance(course_id, &params).await?;

        for (i, rule) in info.allow_access.iter().enumerate() {
            let uids = rule.uids.as_ref().map(serde_json::to_string).transpose()?;
            let rule_params = CourseInstanceAccessRuleParams {
                role: rule.role.map(UserRole::as_str),
                uids,
                start_date: rule.start_date.as_deref().and_then(normalize_rule_date),
                end_date: rule.end_date.as_deref().and_then(normalize_rule_date),
                institution: rule.institution.as_deref(),
            };
            store
                .upsert_course_instance_access_rule(id, i as i64 + 1, &rule_params)
                .await?;
        }
        store
            .prune_positional(
                Positional::CourseInstanceAccessRules,
                id,
                info.allow_access.len() as i64,
            )
            .await?;

        debug!("Course instance {} has id {}", ciid, id);
        ids.insert(ciid.clone(), id);
    }

    let keep: Vec<i64> = ids.values().copied().collect();
    let removed = store
        .prune(PruneScope::CourseInstances { course_id }, &keep)
        .await?;
    debug!("Soft-deleted {} course instances", removed);
    Ok(ids)
}

/// Makes the declared user roles the complete staff list of one course
/// instance. Everyone else enrolled is downgraded to `Student`.
pub async fn sync_course_staff(
    store: &mut dyn CourseStore,
    course_instance_id: i64,
    user_roles: &BTreeMap<String, UserRole>,
) -> Result<u64, SyncError> {
    for (uid, role) in user_roles {
        store
            .upsert_staff_enrollment(course_instance_id, uid, *role)
            .await?;
    }
    let keep: Vec<String> = user_roles.keys().cloned().collect();
    let downgraded = store
        .downgrade_other_enrollments(course_instance_id, &keep)
        .await?;
    debug!(
        "Course instance {}: {} staff, {} downgraded",
        course_instance_id,
        user_roles.len(),
        downgraded
    );
    Ok(downgraded)
}
