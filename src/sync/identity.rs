use std::collections::BTreeMap;

use tracing::debug;

use crate::db::{CourseStore, UuidScope};
use crate::error::SyncError;

/// Rejects two entries of one catalog sharing a UUID. `kind` is the plural
/// entity name used in the message.
pub fn check_catalog_uuids<'a>(
    kind: &'static str,
    entries: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> Result<(), SyncError> {
    let mut by_uuid: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for (id, uuid) in entries {
        by_uuid.entry(uuid).or_default().push(id);
    }
    match by_uuid.into_iter().find(|(_, ids)| ids.len() > 1) {
        Some((uuid, ids)) => Err(SyncError::IdentityCollision {
            uuid: uuid.to_string(),
            kind,
            identifiers: ids.into_iter().map(str::to_string).collect(),
        }),
        None => Ok(()),
    }
}

/// Rejects a UUID that storage already holds for another entity in `scope`.
pub async fn check_uuid_unique(
    store: &mut dyn CourseStore,
    scope: &UuidScope,
    kind: &'static str,
    identifier: &str,
    uuid: &str,
) -> Result<(), SyncError> {
    match store.find_uuid_conflict(scope, uuid).await? {
        Some(other) => Err(SyncError::IdentityCollision {
            uuid: uuid.to_string(),
            kind,
            identifiers: vec![identifier.to_string(), other],
        }),
        None => {
            debug!("UUID {} of {} is free", uuid, identifier);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_catalog_uuid_names_every_directory() {
        let err = check_catalog_uuids(
            "questions",
            [
                ("addition", "11111111-1111-4111-8111-111111111111"),
                ("subtraction", "22222222-2222-4222-8222-222222222222"),
                ("addition-copy", "11111111-1111-4111-8111-111111111111"),
            ],
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "UUID 11111111-1111-4111-8111-111111111111 used in multiple questions: addition, addition-copy"
        );
    }

    #[test]
    fn distinct_uuids_pass() {
        assert!(check_catalog_uuids("assessments", [("hw1", "a"), ("hw2", "b")]).is_ok());
    }
}
