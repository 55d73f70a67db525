//! Shared test store: a [`MemoryRbacStore`] that counts calls and can be
//! told to fail or pause specific operations.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Notify;

use rbac_core::error::AppError;
use rbac_core::result::AppResult;
use rbac_core::types::{PermissionId, RoleId};
use rbac_database::{MemoryRbacStore, RbacStore};
use rbac_entity::{Assignment, Permission, Role};
use rbac_service::RbacCache;

/// Test double wrapping the in-memory store.
#[derive(Debug, Default)]
pub struct TestStore {
    inner: MemoryRbacStore,
    calls: AtomicUsize,
    pub fail_list_roles: AtomicBool,
    pub fail_writes: AtomicBool,
    pub gate: Option<Gate>,
}

/// Pauses `insert_assignment` until released.
#[derive(Debug, Default)]
pub struct Gate {
    pub entered: Notify,
    pub release: Notify,
}

impl TestStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gated() -> Self {
        Self {
            gate: Some(Gate::default()),
            ..Self::default()
        }
    }

    /// Number of store calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The wrapped store, bypassing counting and failure injection.
    pub fn inner(&self) -> &MemoryRbacStore {
        &self.inner
    }

    fn record(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    fn check_write(&self) -> AppResult<()> {
        self.record();
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::database("connection reset by peer"));
        }
        Ok(())
    }
}

#[async_trait]
impl RbacStore for TestStore {
    async fn list_permissions(&self) -> AppResult<Vec<Permission>> {
        self.record();
        self.inner.list_permissions().await
    }

    async fn list_roles(&self) -> AppResult<Vec<Role>> {
        self.record();
        if self.fail_list_roles.load(Ordering::SeqCst) {
            return Err(AppError::database("relation \"roles\" is unavailable"));
        }
        self.inner.list_roles().await
    }

    async fn list_assignments(&self) -> AppResult<Vec<Assignment>> {
        self.record();
        self.inner.list_assignments().await
    }

    async fn insert_permission(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> AppResult<Permission> {
        self.check_write()?;
        self.inner.insert_permission(name, description).await
    }

    async fn update_permission(
        &self,
        id: PermissionId,
        name: &str,
        description: Option<&str>,
    ) -> AppResult<Permission> {
        self.check_write()?;
        self.inner.update_permission(id, name, description).await
    }

    async fn delete_permission(&self, id: PermissionId) -> AppResult<bool> {
        self.check_write()?;
        self.inner.delete_permission(id).await
    }

    async fn insert_role(&self, name: &str, description: Option<&str>) -> AppResult<Role> {
        self.check_write()?;
        self.inner.insert_role(name, description).await
    }

    async fn update_role(
        &self,
        id: RoleId,
        name: &str,
        description: Option<&str>,
    ) -> AppResult<Role> {
        self.check_write()?;
        self.inner.update_role(id, name, description).await
    }

    async fn delete_role(&self, id: RoleId) -> AppResult<bool> {
        self.check_write()?;
        self.inner.delete_role(id).await
    }

    async fn insert_assignment(
        &self,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> AppResult<Assignment> {
        self.check_write()?;
        if let Some(gate) = &self.gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }
        self.inner.insert_assignment(role_id, permission_id).await
    }

    async fn delete_assignment(
        &self,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> AppResult<u64> {
        self.check_write()?;
        self.inner.delete_assignment(role_id, permission_id).await
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}

/// A cache over a fresh [`TestStore`], plus a handle to the store.
pub fn cache_with(store: TestStore) -> (Arc<TestStore>, RbacCache) {
    let store = Arc::new(store);
    let cache = RbacCache::new(store.clone());
    (store, cache)
}

pub fn names<T: rbac_entity::Named>(items: &[T]) -> Vec<String> {
    items.iter().map(|i| i.name().to_string()).collect()
}
