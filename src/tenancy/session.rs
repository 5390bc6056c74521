use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use serde::Serialize;
use tokio::sync::RwLock;

use crate::branding::ThemeApplier;
use crate::db::Store;
use crate::models::{Tenant, TenantBranding, TenantBrandingPatch, TenantSettings, TenantSettingsPatch};

use super::TenancyError;

const DEFAULT_SWITCH_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Default)]
struct SessionState {
    current: Option<Tenant>,
    available: Vec<Tenant>,
    accessible: Vec<String>,
    loading: bool,
    last_error: Option<String>,
}

/// Point-in-time view of the session, served to clients.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub current_tenant: Option<Tenant>,
    pub available_tenants: Vec<Tenant>,
    pub is_loading: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// The active-tenant selection for the signed-in session: which tenant is
/// current, which tenants may be selected, and the persisted pointer that
/// survives restarts.
///
/// Concurrent switches are serialized by a monotonic token: each switch
/// claims the next token on entry and only the holder of the newest token
/// may commit, so a slow lookup can never clobber a later selection.
#[derive(Clone)]
pub struct TenantSession {
    store: Store,
    theme: ThemeApplier,
    switch_timeout: Duration,
    state: Arc<RwLock<SessionState>>,
    switch_seq: Arc<AtomicU64>,
}

impl TenantSession {
    pub fn new(store: Store, theme: ThemeApplier) -> Self {
        Self {
            store,
            theme,
            switch_timeout: DEFAULT_SWITCH_TIMEOUT,
            state: Arc::new(RwLock::new(SessionState::default())),
            switch_seq: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn with_switch_timeout(mut self, timeout: Duration) -> Self {
        self.switch_timeout = timeout;
        self
    }

    async fn with_timeout<T>(
        &self,
        fut: impl Future<Output = Result<T>>,
    ) -> Result<T, TenancyError> {
        match tokio::time::timeout(self.switch_timeout, fut).await {
            Ok(res) => res.map_err(TenancyError::from),
            Err(_) => Err(TenancyError::Timeout),
        }
    }

    async fn begin(&self) {
        let mut state = self.state.write().await;
        state.loading = true;
        state.last_error = None;
    }

    /// Record a failed operation. The last-good tenant and catalog are kept
    /// so the caller can keep working against them.
    async fn fail(&self, err: &TenancyError) {
        let mut state = self.state.write().await;
        state.loading = false;
        state.last_error = Some(err.to_string());
    }

    fn is_accessible(accessible: &[String], tenant_id: &str) -> bool {
        accessible.is_empty() || accessible.iter().any(|id| id == tenant_id)
    }

    /// Load the tenant catalog and restore the persisted selection. An empty
    /// `accessible_ids` grants the whole catalog. A persisted pointer to a
    /// tenant outside the accessible set is cleared; when nothing can be
    /// restored the first accessible tenant is selected.
    pub async fn initialize(&self, accessible_ids: &[String]) -> Result<(), TenancyError> {
        self.begin().await;
        match self.load_initial(accessible_ids).await {
            Ok(()) => Ok(()),
            Err(err) => {
                self.fail(&err).await;
                Err(err)
            }
        }
    }

    async fn load_initial(&self, accessible_ids: &[String]) -> Result<(), TenancyError> {
        let catalog = self.with_timeout(self.store.list_tenants()).await?;
        let available: Vec<Tenant> = catalog
            .into_iter()
            .filter(|t| Self::is_accessible(accessible_ids, &t.id))
            .collect();

        let pointer = self
            .with_timeout(self.store.get_current_tenant_pointer())
            .await?;
        let restored = pointer
            .as_deref()
            .and_then(|id| available.iter().find(|t| t.id == id))
            .cloned();
        if pointer.is_some() && restored.is_none() {
            tracing::warn!(
                "Persisted tenant pointer {:?} is not accessible, clearing it",
                pointer
            );
            self.with_timeout(self.store.clear_current_tenant_pointer())
                .await?;
        }

        let current = restored.or_else(|| available.first().cloned());
        match &current {
            Some(tenant) => {
                self.with_timeout(self.store.set_current_tenant_pointer(&tenant.id))
                    .await?;
                self.theme.apply(tenant).await;
                tracing::info!("Active tenant: {} ({})", tenant.display_name, tenant.id);
            }
            None => self.theme.clear().await,
        }

        let mut state = self.state.write().await;
        state.current = current;
        state.available = available;
        state.accessible = accessible_ids.to_vec();
        state.loading = false;
        state.last_error = None;
        Ok(())
    }

    fn claim_switch_token(&self) -> u64 {
        self.switch_seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Make `tenant_id` the active tenant. Switching to the already-active
    /// tenant is a no-op success.
    pub async fn switch_tenant(&self, tenant_id: &str) -> Result<(), TenancyError> {
        let token = self.claim_switch_token();
        self.perform_switch(token, tenant_id).await
    }

    async fn perform_switch(&self, token: u64, tenant_id: &str) -> Result<(), TenancyError> {
        {
            let state = self.state.read().await;
            if state.current.as_ref().map(|t| t.id.as_str()) == Some(tenant_id) {
                return Ok(());
            }
        }

        self.begin().await;
        let tenant = match self.resolve_switch_target(tenant_id).await {
            Ok(tenant) => tenant,
            Err(err) => {
                self.fail(&err).await;
                return Err(err);
            }
        };

        let mut state = self.state.write().await;
        if self.switch_seq.load(Ordering::SeqCst) != token {
            tracing::debug!(
                "Discarding stale switch to {} (superseded before commit)",
                tenant_id
            );
            state.loading = false;
            return Ok(());
        }

        if let Err(err) = self.store.set_current_tenant_pointer(&tenant.id).await {
            let err = TenancyError::from(err);
            state.loading = false;
            state.last_error = Some(err.to_string());
            return Err(err);
        }
        self.theme.apply(&tenant).await;
        tracing::info!("Switched to tenant {} ({})", tenant.display_name, tenant.id);
        state.current = Some(tenant);
        state.loading = false;
        state.last_error = None;
        Ok(())
    }

    /// Resolve a switch target: an id absent from the catalog is NotFound
    /// regardless of the caller's accessible set; access is checked second.
    async fn resolve_switch_target(&self, tenant_id: &str) -> Result<Tenant, TenancyError> {
        let tenant = self
            .with_timeout(self.store.get_tenant(tenant_id))
            .await?
            .ok_or_else(|| TenancyError::TenantNotFound(tenant_id.to_string()))?;

        let state = self.state.read().await;
        if !Self::is_accessible(&state.accessible, tenant_id) {
            return Err(TenancyError::AccessDenied(tenant_id.to_string()));
        }
        Ok(tenant)
    }

    /// Apply a settings patch to the active tenant. Top-level fields merge;
    /// nested records in the patch replace their counterpart wholesale. The
    /// merged result is written to the tenant's namespaced storage before
    /// the in-memory state changes, so a write failure leaves the session
    /// on its last-good settings.
    pub async fn update_settings(
        &self,
        patch: &TenantSettingsPatch,
    ) -> Result<TenantSettings, TenancyError> {
        let mut state = self.state.write().await;
        let tenant = state.current.as_mut().ok_or(TenancyError::NoActiveTenant)?;

        let mut settings = tenant.settings.clone();
        patch.apply(&mut settings);
        let value = serde_json::to_value(&settings)
            .map_err(|e| TenancyError::Storage(e.into()))?;
        self.store
            .set_tenant_data(&tenant.id, "settings", &value)
            .await
            .map_err(TenancyError::from)?;

        tenant.settings = settings.clone();
        state.last_error = None;
        Ok(settings)
    }

    /// Apply a branding patch to the active tenant and re-apply the theme.
    pub async fn update_branding(
        &self,
        patch: &TenantBrandingPatch,
    ) -> Result<TenantBranding, TenancyError> {
        let mut state = self.state.write().await;
        let tenant = state.current.as_mut().ok_or(TenancyError::NoActiveTenant)?;

        let mut branding = tenant.branding.clone();
        patch.apply(&mut branding);
        let value = serde_json::to_value(&branding)
            .map_err(|e| TenancyError::Storage(e.into()))?;
        self.store
            .set_tenant_data(&tenant.id, "branding", &value)
            .await
            .map_err(TenancyError::from)?;

        tenant.branding = branding.clone();
        let updated = tenant.clone();
        state.last_error = None;
        drop(state);

        self.theme.apply(&updated).await;
        Ok(branding)
    }

    /// Re-read the catalog and refresh the active tenant from it. If the
    /// active tenant has disappeared from the catalog the selection is
    /// cleared along with the persisted pointer.
    pub async fn refresh(&self) -> Result<(), TenancyError> {
        self.begin().await;
        match self.reload().await {
            Ok(()) => Ok(()),
            Err(err) => {
                self.fail(&err).await;
                Err(err)
            }
        }
    }

    async fn reload(&self) -> Result<(), TenancyError> {
        let accessible = {
            let state = self.state.read().await;
            state.accessible.clone()
        };
        let catalog = self.with_timeout(self.store.list_tenants()).await?;
        let available: Vec<Tenant> = catalog
            .into_iter()
            .filter(|t| Self::is_accessible(&accessible, &t.id))
            .collect();

        let mut state = self.state.write().await;
        let refreshed = state
            .current
            .as_ref()
            .and_then(|cur| available.iter().find(|t| t.id == cur.id))
            .cloned();
        if state.current.is_some() && refreshed.is_none() {
            tracing::warn!("Active tenant left the catalog, clearing selection");
            self.store.clear_current_tenant_pointer().await?;
            self.theme.clear().await;
        } else if let Some(tenant) = &refreshed {
            self.theme.apply(tenant).await;
        }
        state.current = refreshed;
        state.available = available;
        state.loading = false;
        state.last_error = None;
        Ok(())
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.read().await;
        SessionSnapshot {
            current_tenant: state.current.clone(),
            available_tenants: state.available.clone(),
            is_loading: state.loading,
            error: state.last_error.clone(),
        }
    }

    pub async fn current_tenant_id(&self) -> Option<String> {
        self.state.read().await.current.as_ref().map(|t| t.id.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WorkingHours;

    async fn session() -> TenantSession {
        let store = Store::in_memory().await.unwrap();
        TenantSession::new(store, ThemeApplier::new())
    }

    #[tokio::test]
    async fn test_initialize_selects_first_tenant() {
        let session = session().await;
        session.initialize(&[]).await.unwrap();

        let snap = session.snapshot().await;
        assert_eq!(snap.available_tenants.len(), 4);
        assert_eq!(
            snap.current_tenant.as_ref().map(|t| t.id.as_str()),
            Some("tenant-001")
        );
        assert!(!snap.is_loading);
        assert!(snap.error.is_none());
    }

    #[tokio::test]
    async fn test_initialize_restores_persisted_pointer() {
        let session = session().await;
        session.store.set_current_tenant_pointer("tenant-003").await.unwrap();

        session.initialize(&[]).await.unwrap();
        assert_eq!(session.current_tenant_id().await.as_deref(), Some("tenant-003"));
    }

    #[tokio::test]
    async fn test_initialize_clears_inaccessible_pointer() {
        let session = session().await;
        session.store.set_current_tenant_pointer("tenant-003").await.unwrap();

        session
            .initialize(&["tenant-002".to_string(), "tenant-004".to_string()])
            .await
            .unwrap();

        let snap = session.snapshot().await;
        assert_eq!(
            snap.current_tenant.as_ref().map(|t| t.id.as_str()),
            Some("tenant-002")
        );
        assert_eq!(snap.available_tenants.len(), 2);
        // the stale pointer was replaced by the fallback selection
        assert_eq!(
            session.store.get_current_tenant_pointer().await.unwrap().as_deref(),
            Some("tenant-002")
        );
    }

    #[tokio::test]
    async fn test_switch_tenant_persists_pointer_and_theme() {
        let session = session().await;
        session.initialize(&[]).await.unwrap();

        session.switch_tenant("tenant-002").await.unwrap();

        assert_eq!(session.current_tenant_id().await.as_deref(), Some("tenant-002"));
        assert_eq!(
            session.store.get_current_tenant_pointer().await.unwrap().as_deref(),
            Some("tenant-002")
        );
        let theme = session.theme.snapshot().await;
        assert_eq!(theme.tenant_id.as_deref(), Some("tenant-002"));
        assert_eq!(theme.variables["--tenant-primary"], "#059669");
    }

    #[tokio::test]
    async fn test_switch_to_current_is_noop() {
        let session = session().await;
        session.initialize(&[]).await.unwrap();

        session.switch_tenant("tenant-001").await.unwrap();
        let snap = session.snapshot().await;
        assert!(!snap.is_loading);
        assert!(snap.error.is_none());
    }

    #[tokio::test]
    async fn test_switch_to_unknown_tenant_keeps_last_good_state() {
        let session = session().await;
        session.initialize(&[]).await.unwrap();

        let err = session.switch_tenant("tenant-999").await.unwrap_err();
        assert!(matches!(err, TenancyError::TenantNotFound(_)));

        let snap = session.snapshot().await;
        assert_eq!(
            snap.current_tenant.as_ref().map(|t| t.id.as_str()),
            Some("tenant-001")
        );
        assert!(!snap.is_loading);
        assert_eq!(snap.error.as_deref(), Some("Tenant not found: tenant-999"));
    }

    #[tokio::test]
    async fn test_unknown_tenant_is_not_found_even_with_restricted_access() {
        let session = session().await;
        session.initialize(&["tenant-001".to_string()]).await.unwrap();

        // an id missing from the catalog is NotFound, not AccessDenied
        let err = session.switch_tenant("tenant-999").await.unwrap_err();
        assert!(matches!(err, TenancyError::TenantNotFound(_)));
        assert_eq!(session.current_tenant_id().await.as_deref(), Some("tenant-001"));
    }

    #[tokio::test]
    async fn test_switch_outside_accessible_set_is_denied() {
        let session = session().await;
        session.initialize(&["tenant-001".to_string()]).await.unwrap();

        let err = session.switch_tenant("tenant-004").await.unwrap_err();
        assert!(matches!(err, TenancyError::AccessDenied(_)));
        assert_eq!(session.current_tenant_id().await.as_deref(), Some("tenant-001"));
    }

    #[tokio::test]
    async fn test_stale_switch_is_discarded() {
        let session = session().await;
        session.initialize(&[]).await.unwrap();

        // a slow switch claims its token first, then a later switch commits
        let slow_token = session.claim_switch_token();
        session.switch_tenant("tenant-002").await.unwrap();

        session.perform_switch(slow_token, "tenant-003").await.unwrap();
        assert_eq!(session.current_tenant_id().await.as_deref(), Some("tenant-002"));
        assert_eq!(
            session.store.get_current_tenant_pointer().await.unwrap().as_deref(),
            Some("tenant-002")
        );
    }

    #[tokio::test]
    async fn test_update_settings_requires_active_tenant() {
        let session = session().await;
        let err = session
            .update_settings(&TenantSettingsPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, TenancyError::NoActiveTenant));

        // the failed update must not have written to any tenant's namespace
        for tenant in session.store.list_tenants().await.unwrap() {
            assert!(session
                .store
                .list_tenant_keys(&tenant.id)
                .await
                .unwrap()
                .is_empty());
        }
    }

    #[tokio::test]
    async fn test_update_settings_shallow_merges_and_persists() {
        let session = session().await;
        session.initialize(&[]).await.unwrap();

        let patch = TenantSettingsPatch {
            timezone: Some("UTC".to_string()),
            working_hours: Some(WorkingHours {
                start: "08:00".to_string(),
                end: "16:00".to_string(),
            }),
            ..Default::default()
        };
        let settings = session.update_settings(&patch).await.unwrap();

        assert_eq!(settings.timezone, "UTC");
        assert_eq!(settings.working_hours.start, "08:00");
        // untouched top-level fields survive the merge
        assert_eq!(settings.company_name, "Textiles ABC Internacional S.A.");

        // the override lands in the tenant's namespace, not the catalog row
        let stored = session
            .store
            .get_tenant_data("tenant-001", "settings")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored["timezone"], "UTC");
        let catalog_row = session.store.get_tenant("tenant-001").await.unwrap().unwrap();
        assert_ne!(catalog_row.settings.timezone, "UTC");
    }

    #[tokio::test]
    async fn test_update_branding_reapplies_theme() {
        let session = session().await;
        session.initialize(&[]).await.unwrap();

        let patch = TenantBrandingPatch {
            primary_color: Some("#111111".to_string()),
            ..Default::default()
        };
        let branding = session.update_branding(&patch).await.unwrap();

        assert_eq!(branding.primary_color, "#111111");
        // secondary untouched
        assert_eq!(branding.secondary_color, "#7c3aed");
        let theme = session.theme.snapshot().await;
        assert_eq!(theme.variables["--tenant-primary"], "#111111");

        let stored = session
            .store
            .get_tenant_data("tenant-001", "branding")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored["primary_color"], "#111111");
        assert_eq!(stored["secondary_color"], "#7c3aed");
    }

    #[tokio::test]
    async fn test_empty_accessible_set_is_valid_not_an_error() {
        let session = session().await;
        session.initialize(&["tenant-999".to_string()]).await.unwrap();

        let snap = session.snapshot().await;
        assert!(snap.current_tenant.is_none());
        assert!(snap.available_tenants.is_empty());
        assert!(snap.error.is_none());
        assert!(!snap.is_loading);

        let theme = session.theme.snapshot().await;
        assert!(theme.tenant_id.is_none());
    }

    #[tokio::test]
    async fn test_refresh_picks_up_catalog_state() {
        let session = session().await;
        session.initialize(&[]).await.unwrap();
        session.switch_tenant("tenant-004").await.unwrap();

        session.refresh().await.unwrap();

        let snap = session.snapshot().await;
        assert_eq!(
            snap.current_tenant.as_ref().map(|t| t.id.as_str()),
            Some("tenant-004")
        );
        assert_eq!(snap.available_tenants.len(), 4);
    }
}
