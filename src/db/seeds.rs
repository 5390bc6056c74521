use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::models::*;

fn features(administration: bool, quality_control: bool, inventory: bool, analytics: bool) -> TenantFeatures {
    TenantFeatures {
        modules: true,
        people: true,
        references: true,
        reports: true,
        administration,
        quality_control,
        inventory,
        analytics,
    }
}

fn notifications(email: bool, low_efficiency_alerts: bool) -> TenantNotifications {
    TenantNotifications {
        email,
        in_app: true,
        production_alerts: true,
        low_efficiency_alerts,
    }
}

fn hours(start: &str, end: &str) -> WorkingHours {
    WorkingHours {
        start: start.to_string(),
        end: end.to_string(),
    }
}

fn date(s: &str) -> Result<DateTime<Utc>> {
    Ok(s.parse::<DateTime<Utc>>()?)
}

/// The demo tenant catalog. Inserted only when a tenant id is missing, so a
/// database that outlives a deploy keeps whatever catalog it already has.
pub fn seed_tenant_records() -> Result<Vec<Tenant>> {
    Ok(vec![
        Tenant {
            id: "tenant-001".to_string(),
            name: "textiles-abc".to_string(),
            slug: "textiles-abc".to_string(),
            display_name: "Textiles ABC Internacional".to_string(),
            description: Some("Empresa líder en confección de prendas deportivas".to_string()),
            status: tenant_status::ACTIVE.to_string(),
            plan_type: tenant_plan::ENTERPRISE.to_string(),
            trial_ends_at: None,
            created_at: date("2023-01-15T00:00:00Z")?,
            branding: TenantBranding {
                primary_color: "#2563eb".to_string(),
                secondary_color: "#7c3aed".to_string(),
                accent_color: Some("#06b6d4".to_string()),
                logo_url: Some("/logos/textiles-abc.png".to_string()),
                favicon_url: None,
                header_bg_color: Some("#1e40af".to_string()),
            },
            settings: TenantSettings {
                company_name: "Textiles ABC Internacional S.A.".to_string(),
                timezone: "America/Bogota".to_string(),
                date_format: "DD/MM/YYYY".to_string(),
                time_format: "24h".to_string(),
                currency: "COP".to_string(),
                language: "es".to_string(),
                features: features(true, true, true, true),
                notifications: notifications(true, true),
                working_hours: hours("07:00", "18:00"),
                default_efficiency_threshold: 85,
            },
            limits: TenantLimits {
                max_users: 500,
                max_modules: 50,
                max_storage_gb: 200,
                api_calls_per_month: 1_000_000,
            },
            contact_email: Some("admin@textilesabc.com".to_string()),
            contact_phone: Some("+57 300 123 4567".to_string()),
            address: Some("Carrera 45 #78-90, Medellín, Colombia".to_string()),
        },
        Tenant {
            id: "tenant-002".to_string(),
            name: "confecciones-valle".to_string(),
            slug: "confecciones-valle".to_string(),
            display_name: "Confecciones Del Valle".to_string(),
            description: Some("Especialistas en uniformes corporativos y escolares".to_string()),
            status: tenant_status::ACTIVE.to_string(),
            plan_type: tenant_plan::PREMIUM.to_string(),
            trial_ends_at: None,
            created_at: date("2023-06-20T00:00:00Z")?,
            branding: TenantBranding {
                primary_color: "#059669".to_string(),
                secondary_color: "#0891b2".to_string(),
                accent_color: Some("#f59e0b".to_string()),
                logo_url: Some("/logos/confecciones-valle.png".to_string()),
                favicon_url: None,
                header_bg_color: Some("#047857".to_string()),
            },
            settings: TenantSettings {
                company_name: "Confecciones Del Valle Ltda.".to_string(),
                timezone: "America/Bogota".to_string(),
                date_format: "DD/MM/YYYY".to_string(),
                time_format: "12h".to_string(),
                currency: "COP".to_string(),
                language: "es".to_string(),
                features: features(true, true, false, true),
                notifications: notifications(true, false),
                working_hours: hours("08:00", "17:00"),
                default_efficiency_threshold: 80,
            },
            limits: TenantLimits {
                max_users: 150,
                max_modules: 20,
                max_storage_gb: 100,
                api_calls_per_month: 100_000,
            },
            contact_email: Some("contacto@confeccionesvalle.com".to_string()),
            contact_phone: Some("+57 315 987 6543".to_string()),
            address: Some("Calle 25 #15-32, Cali, Colombia".to_string()),
        },
        Tenant {
            id: "tenant-003".to_string(),
            name: "taller-produccion".to_string(),
            slug: "taller-produccion".to_string(),
            display_name: "Taller Producción".to_string(),
            description: Some("Taller de confección familiar".to_string()),
            status: tenant_status::TRIAL.to_string(),
            plan_type: tenant_plan::STANDARD.to_string(),
            trial_ends_at: Some(date("2025-12-31T00:00:00Z")?),
            created_at: date("2024-11-01T00:00:00Z")?,
            branding: TenantBranding {
                primary_color: "#dc2626".to_string(),
                secondary_color: "#ea580c".to_string(),
                accent_color: Some("#4f46e5".to_string()),
                logo_url: Some("/logos/taller-produccion.png".to_string()),
                favicon_url: None,
                header_bg_color: Some("#b91c1c".to_string()),
            },
            settings: TenantSettings {
                company_name: "Taller Producción".to_string(),
                timezone: "America/Bogota".to_string(),
                date_format: "DD/MM/YYYY".to_string(),
                time_format: "24h".to_string(),
                currency: "COP".to_string(),
                language: "es".to_string(),
                features: features(false, false, false, false),
                notifications: notifications(false, false),
                working_hours: hours("08:00", "16:00"),
                default_efficiency_threshold: 75,
            },
            limits: TenantLimits {
                max_users: 50,
                max_modules: 10,
                max_storage_gb: 50,
                api_calls_per_month: 10_000,
            },
            contact_email: Some("info@tallerproduccion.com".to_string()),
            contact_phone: Some("+57 320 456 7890".to_string()),
            address: Some("Carrera 10 #5-20, Bogotá, Colombia".to_string()),
        },
        Tenant {
            id: "tenant-004".to_string(),
            name: "elite-fashion".to_string(),
            slug: "elite-fashion".to_string(),
            display_name: "Elite Fashion Group".to_string(),
            description: Some("Grupo de empresas de moda premium".to_string()),
            status: tenant_status::ACTIVE.to_string(),
            plan_type: tenant_plan::ENTERPRISE.to_string(),
            trial_ends_at: None,
            created_at: date("2022-03-10T00:00:00Z")?,
            branding: TenantBranding {
                primary_color: "#7c3aed".to_string(),
                secondary_color: "#ec4899".to_string(),
                accent_color: Some("#f59e0b".to_string()),
                logo_url: Some("/logos/elite-fashion.png".to_string()),
                favicon_url: None,
                header_bg_color: Some("#6d28d9".to_string()),
            },
            settings: TenantSettings {
                company_name: "Elite Fashion Group S.A.S.".to_string(),
                timezone: "America/Mexico_City".to_string(),
                date_format: "MM/DD/YYYY".to_string(),
                time_format: "12h".to_string(),
                currency: "MXN".to_string(),
                language: "es".to_string(),
                features: features(true, true, true, true),
                notifications: notifications(true, true),
                working_hours: hours("08:00", "19:00"),
                default_efficiency_threshold: 90,
            },
            limits: TenantLimits {
                max_users: 1000,
                max_modules: 100,
                max_storage_gb: 500,
                api_calls_per_month: 5_000_000,
            },
            contact_email: Some("corporativo@elitefashion.mx".to_string()),
            contact_phone: Some("+52 55 1234 5678".to_string()),
            address: Some("Av. Insurgentes Sur 1234, CDMX, México".to_string()),
        },
    ])
}

/// Demo users: (username, password, email, display_name, role, tenant ids).
/// Empty tenant id list means access to the whole catalog.
pub fn seed_user_params() -> Vec<(&'static str, &'static str, &'static str, &'static str, &'static str, Vec<&'static str>)> {
    vec![
        (
            "admin",
            "admin",
            "admin@company.com",
            "Michael Chen",
            user_role::ADMINISTRATOR,
            vec![],
        ),
        (
            "supervisor",
            "supervisor",
            "supervisor@company.com",
            "Sarah Johnson",
            user_role::SUPERVISOR,
            vec!["tenant-001"],
        ),
        (
            "operator",
            "operator",
            "operator@company.com",
            "David Martinez",
            user_role::OPERATOR,
            vec!["tenant-001"],
        ),
    ]
}

/// Test fixture: a tenant whose plan allows no stored data at all, for
/// exercising the storage quota path.
#[cfg(test)]
pub async fn insert_zero_quota_tenant(store: &super::Store) -> Result<()> {
    let mut tenants = seed_tenant_records()?;
    let mut tenant = tenants.remove(0);
    tenant.id = "tenant-000".to_string();
    tenant.name = "zero-quota".to_string();
    tenant.slug = "zero-quota".to_string();
    tenant.display_name = "Zero Quota".to_string();
    tenant.limits.max_storage_gb = 0;
    super::tenants::TenantRepo::insert_if_missing(store.pool(), &tenant).await
}
