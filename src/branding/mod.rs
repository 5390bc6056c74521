use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::models::Tenant;

const DEFAULT_TITLE: &str = "Textile Production Dashboard";

/// The presentation state derived from one tenant's branding: theme
/// variables, document title, and favicon, served to the SPA shell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppliedTheme {
    pub tenant_id: Option<String>,
    pub document_title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favicon_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    pub variables: BTreeMap<String, String>,
}

impl Default for AppliedTheme {
    fn default() -> Self {
        Self {
            tenant_id: None,
            document_title: DEFAULT_TITLE.to_string(),
            favicon_url: None,
            logo_url: None,
            variables: BTreeMap::new(),
        }
    }
}

/// ThemeApplier pushes a tenant's branding into shared presentation state.
/// Each apply replaces the whole theme, so nothing from the previously
/// active tenant can leak through a switch.
#[derive(Clone)]
pub struct ThemeApplier {
    inner: Arc<RwLock<AppliedTheme>>,
}

impl Default for ThemeApplier {
    fn default() -> Self {
        Self::new()
    }
}

impl ThemeApplier {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(AppliedTheme::default())),
        }
    }

    pub async fn apply(&self, tenant: &Tenant) {
        let branding = &tenant.branding;

        let mut variables = BTreeMap::new();
        variables.insert("--tenant-primary".to_string(), branding.primary_color.clone());
        variables.insert("--tenant-secondary".to_string(), branding.secondary_color.clone());
        if let Some(accent) = &branding.accent_color {
            variables.insert("--tenant-accent".to_string(), accent.clone());
        }
        if let Some(header_bg) = &branding.header_bg_color {
            variables.insert("--tenant-header-bg".to_string(), header_bg.clone());
        }

        let theme = AppliedTheme {
            tenant_id: Some(tenant.id.clone()),
            document_title: format!("{} - {}", tenant.display_name, DEFAULT_TITLE),
            favicon_url: branding.favicon_url.clone(),
            logo_url: branding.logo_url.clone(),
            variables,
        };

        let mut inner = self.inner.write().await;
        if *inner != theme {
            tracing::debug!("Applied branding for tenant {}", tenant.id);
            *inner = theme;
        }
    }

    /// Reset to the unbranded default, for the no-tenant state.
    pub async fn clear(&self) {
        let mut inner = self.inner.write().await;
        *inner = AppliedTheme::default();
    }

    pub async fn snapshot(&self) -> AppliedTheme {
        self.inner.read().await.clone()
    }

    /// Render the theme variables as a CSS custom-property block the SPA
    /// can link directly.
    pub async fn render_css(&self) -> String {
        let inner = self.inner.read().await;
        let mut css = String::from(":root {\n");
        for (name, value) in &inner.variables {
            css.push_str(&format!("  {}: {};\n", name, value));
        }
        css.push_str("}\n");
        css
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::seeds::seed_tenant_records;

    fn fixture(idx: usize) -> Tenant {
        seed_tenant_records().unwrap().remove(idx)
    }

    #[tokio::test]
    async fn test_apply_sets_variables_and_title() {
        let theme = ThemeApplier::new();
        let tenant = fixture(0); // Textiles ABC

        theme.apply(&tenant).await;
        let snap = theme.snapshot().await;

        assert_eq!(snap.tenant_id.as_deref(), Some("tenant-001"));
        assert_eq!(
            snap.document_title,
            "Textiles ABC Internacional - Textile Production Dashboard"
        );
        assert_eq!(snap.variables["--tenant-primary"], "#2563eb");
        assert_eq!(snap.variables["--tenant-header-bg"], "#1e40af");
    }

    #[tokio::test]
    async fn test_switch_fully_overwrites_previous_theme() {
        let theme = ThemeApplier::new();
        let mut first = fixture(0);
        first.branding.accent_color = Some("#06b6d4".to_string());
        let mut second = fixture(1);
        second.branding.accent_color = None;
        second.branding.header_bg_color = None;

        theme.apply(&first).await;
        theme.apply(&second).await;
        let snap = theme.snapshot().await;

        // no stale keys from the first tenant survive
        assert!(!snap.variables.contains_key("--tenant-accent"));
        assert!(!snap.variables.contains_key("--tenant-header-bg"));
        assert_eq!(snap.variables["--tenant-primary"], second.branding.primary_color);
        assert_eq!(snap.tenant_id.as_deref(), Some("tenant-002"));
    }

    #[tokio::test]
    async fn test_reapply_is_idempotent() {
        let theme = ThemeApplier::new();
        let tenant = fixture(2);

        theme.apply(&tenant).await;
        let before = theme.snapshot().await;
        theme.apply(&tenant).await;
        let after = theme.snapshot().await;

        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_clear_resets_to_default() {
        let theme = ThemeApplier::new();
        theme.apply(&fixture(3)).await;
        theme.clear().await;

        let snap = theme.snapshot().await;
        assert_eq!(snap, AppliedTheme::default());
        assert_eq!(snap.document_title, "Textile Production Dashboard");
    }

    #[tokio::test]
    async fn test_render_css() {
        let theme = ThemeApplier::new();
        theme.apply(&fixture(0)).await;

        let css = theme.render_css().await;
        assert!(css.starts_with(":root {"));
        assert!(css.contains("  --tenant-primary: #2563eb;"));
        assert!(css.trim_end().ends_with('}'));
    }
}
