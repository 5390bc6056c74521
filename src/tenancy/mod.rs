mod session;

pub use session::{SessionSnapshot, TenantSession};

use std::error::Error;
use std::fmt;

/// Failures surfaced by tenant session operations. Storage wraps the
/// underlying database error; the rest map to distinct API responses.
#[derive(Debug)]
pub enum TenancyError {
    TenantNotFound(String),
    AccessDenied(String),
    NoActiveTenant,
    Storage(anyhow::Error),
    Timeout,
}

impl fmt::Display for TenancyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TenancyError::TenantNotFound(id) => write!(f, "Tenant not found: {}", id),
            TenancyError::AccessDenied(id) => write!(f, "Access denied to tenant: {}", id),
            TenancyError::NoActiveTenant => write!(f, "No active tenant selected"),
            TenancyError::Storage(err) => write!(f, "Tenant storage error: {}", err),
            TenancyError::Timeout => write!(f, "Timed out loading tenant"),
        }
    }
}

impl Error for TenancyError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            TenancyError::Storage(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<anyhow::Error> for TenancyError {
    fn from(err: anyhow::Error) -> Self {
        TenancyError::Storage(err)
    }
}
