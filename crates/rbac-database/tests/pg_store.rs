//! PostgreSQL store tests.
//!
//! These need a disposable database; run them with
//! `RBAC_TEST_DATABASE_URL=postgres://... cargo test -- --ignored`.

use rbac_core::ErrorKind;
use rbac_core::config::DatabaseConfig;
use rbac_core::types::{PermissionId, RoleId};
use rbac_database::{DatabasePool, PgRbacStore, RbacStore};

async fn store() -> PgRbacStore {
    let url = std::env::var("RBAC_TEST_DATABASE_URL")
        .expect("RBAC_TEST_DATABASE_URL must point at a test database");
    let config = DatabaseConfig {
        url,
        max_connections: 2,
        min_connections: 1,
        connect_timeout_seconds: 5,
        idle_timeout_seconds: 60,
        run_migrations: true,
    };
    let db = DatabasePool::connect(&config)
        .await
        .expect("Failed to connect to test database");
    PgRbacStore::new(db)
}

/// A name no other test run will collide with.
fn unique(prefix: &str) -> String {
    format!("{prefix}_{}", PermissionId::new())
}

#[tokio::test]
#[ignore = "requires RBAC_TEST_DATABASE_URL"]
async fn test_insert_and_list_round_trip() {
    let store = store().await;
    let name = unique("can_view_reports");

    let created = store
        .insert_permission(&name, Some("Read reports"))
        .await
        .unwrap();
    let listed = store.list_permissions().await.unwrap();

    let found: Vec<_> = listed.iter().filter(|p| p.name == name).collect();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, created.id);
    assert_eq!(found[0].description.as_deref(), Some("Read reports"));

    assert!(store.delete_permission(created.id).await.unwrap());
}

#[tokio::test]
#[ignore = "requires RBAC_TEST_DATABASE_URL"]
async fn test_duplicate_names_conflict() {
    let store = store().await;
    let name = unique("Auditor");

    let role = store.insert_role(&name, None).await.unwrap();
    let err = store.insert_role(&name, None).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);

    store.delete_role(role.id).await.unwrap();
}

#[tokio::test]
#[ignore = "requires RBAC_TEST_DATABASE_URL"]
async fn test_assignment_lifecycle() {
    let store = store().await;
    let role = store.insert_role(&unique("Editor"), None).await.unwrap();
    let perm = store
        .insert_permission(&unique("can_edit"), None)
        .await
        .unwrap();

    let link = store.insert_assignment(role.id, perm.id).await.unwrap();
    assert!(link.links(role.id, perm.id));

    let err = store.insert_assignment(role.id, perm.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::AlreadyAssigned);

    assert_eq!(store.delete_assignment(role.id, perm.id).await.unwrap(), 1);
    assert_eq!(store.delete_assignment(role.id, perm.id).await.unwrap(), 0);

    store.delete_role(role.id).await.unwrap();
    store.delete_permission(perm.id).await.unwrap();
}

#[tokio::test]
#[ignore = "requires RBAC_TEST_DATABASE_URL"]
async fn test_delete_role_cascades_links() {
    let store = store().await;
    let role = store.insert_role(&unique("Viewer"), None).await.unwrap();
    let perm = store
        .insert_permission(&unique("can_read"), None)
        .await
        .unwrap();
    store.insert_assignment(role.id, perm.id).await.unwrap();

    assert!(store.delete_role(role.id).await.unwrap());

    let links = store.list_assignments().await.unwrap();
    assert!(links.iter().all(|a| a.role_id != role.id));
    store.delete_permission(perm.id).await.unwrap();
}

#[tokio::test]
#[ignore = "requires RBAC_TEST_DATABASE_URL"]
async fn test_missing_rows() {
    let store = store().await;

    let err = store
        .update_role(RoleId::new(), "Ghost", None)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    assert!(!store.delete_permission(PermissionId::new()).await.unwrap());

    let err = store
        .insert_assignment(RoleId::new(), PermissionId::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    assert!(store.health_check().await.unwrap());
}
