use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Canonical tenant lifecycle status values
pub mod tenant_status {
    pub const ACTIVE: &str = "active";
    pub const TRIAL: &str = "trial";
    pub const SUSPENDED: &str = "suspended";
    pub const INACTIVE: &str = "inactive";

    pub const ALL: &[&str] = &[ACTIVE, TRIAL, SUSPENDED, INACTIVE];

    pub fn is_valid(status: &str) -> bool {
        ALL.contains(&status)
    }
}

/// Canonical tenant plan tiers
pub mod tenant_plan {
    pub const BASIC: &str = "basic";
    pub const STANDARD: &str = "standard";
    pub const PREMIUM: &str = "premium";
    pub const ENTERPRISE: &str = "enterprise";

    pub const ALL: &[&str] = &[BASIC, STANDARD, PREMIUM, ENTERPRISE];

    pub fn is_valid(plan: &str) -> bool {
        ALL.contains(&plan)
    }
}

/// TenantBranding holds a tenant's visual identity overrides
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TenantBranding {
    pub primary_color: String,
    pub secondary_color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accent_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favicon_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header_bg_color: Option<String>,
}

/// Feature flags gating dashboard sections per tenant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TenantFeatures {
    pub modules: bool,
    pub people: bool,
    pub references: bool,
    pub reports: bool,
    pub administration: bool,
    pub quality_control: bool,
    pub inventory: bool,
    pub analytics: bool,
}

/// Notification channel flags
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TenantNotifications {
    pub email: bool,
    pub in_app: bool,
    pub production_alerts: bool,
    pub low_efficiency_alerts: bool,
}

/// Plant working hours, "HH:MM" in the tenant's timezone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkingHours {
    pub start: String,
    pub end: String,
}

/// TenantSettings holds per-tenant operational configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TenantSettings {
    pub company_name: String,
    pub timezone: String,
    pub date_format: String, // MM/DD/YYYY, DD/MM/YYYY, YYYY-MM-DD
    pub time_format: String, // 12h, 24h
    pub currency: String,
    pub language: String,
    pub features: TenantFeatures,
    pub notifications: TenantNotifications,
    pub working_hours: WorkingHours,
    pub default_efficiency_threshold: i32,
}

/// Numeric plan limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TenantLimits {
    pub max_users: i64,
    pub max_modules: i64,
    pub max_storage_gb: i64,
    pub api_calls_per_month: i64,
}

/// Tenant is one customer organization in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tenant {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: String,
    pub plan_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trial_ends_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub branding: TenantBranding,
    pub settings: TenantSettings,
    pub limits: TenantLimits,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// Partial settings update. Present fields replace the current value;
/// nested sub-records (features, notifications, working_hours) replace
/// wholesale when present — the merge is shallow.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TenantSettingsPatch {
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub date_format: Option<String>,
    #[serde(default)]
    pub time_format: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub features: Option<TenantFeatures>,
    #[serde(default)]
    pub notifications: Option<TenantNotifications>,
    #[serde(default)]
    pub working_hours: Option<WorkingHours>,
    #[serde(default)]
    pub default_efficiency_threshold: Option<i32>,
}

impl TenantSettingsPatch {
    pub fn apply(&self, settings: &mut TenantSettings) {
        if let Some(v) = &self.company_name {
            settings.company_name = v.clone();
        }
        if let Some(v) = &self.timezone {
            settings.timezone = v.clone();
        }
        if let Some(v) = &self.date_format {
            settings.date_format = v.clone();
        }
        if let Some(v) = &self.time_format {
            settings.time_format = v.clone();
        }
        if let Some(v) = &self.currency {
            settings.currency = v.clone();
        }
        if let Some(v) = &self.language {
            settings.language = v.clone();
        }
        if let Some(v) = &self.features {
            settings.features = v.clone();
        }
        if let Some(v) = &self.notifications {
            settings.notifications = v.clone();
        }
        if let Some(v) = &self.working_hours {
            settings.working_hours = v.clone();
        }
        if let Some(v) = self.default_efficiency_threshold {
            settings.default_efficiency_threshold = v;
        }
    }
}

/// Partial branding update. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TenantBrandingPatch {
    #[serde(default)]
    pub primary_color: Option<String>,
    #[serde(default)]
    pub secondary_color: Option<String>,
    #[serde(default)]
    pub accent_color: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub favicon_url: Option<String>,
    #[serde(default)]
    pub header_bg_color: Option<String>,
}

impl TenantBrandingPatch {
    pub fn apply(&self, branding: &mut TenantBranding) {
        if let Some(v) = &self.primary_color {
            branding.primary_color = v.clone();
        }
        if let Some(v) = &self.secondary_color {
            branding.secondary_color = v.clone();
        }
        if let Some(v) = &self.accent_color {
            branding.accent_color = Some(v.clone());
        }
        if let Some(v) = &self.logo_url {
            branding.logo_url = Some(v.clone());
        }
        if let Some(v) = &self.favicon_url {
            branding.favicon_url = Some(v.clone());
        }
        if let Some(v) = &self.header_bg_color {
            branding.header_bg_color = Some(v.clone());
        }
    }

    /// Color fields present in the patch, for validation
    pub fn colors(&self) -> impl Iterator<Item = &String> {
        [
            self.primary_color.as_ref(),
            self.secondary_color.as_ref(),
            self.accent_color.as_ref(),
            self.header_bg_color.as_ref(),
        ]
        .into_iter()
        .flatten()
    }
}

/// Per-tenant storage usage summary
#[derive(Debug, Clone, Serialize)]
pub struct TenantStorageStats {
    pub item_count: i64,
    pub size_bytes: i64,
    pub keys: Vec<String>,
}
