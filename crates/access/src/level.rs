//! Admin levels and legacy synonym resolution.

use serde::{Deserialize, Serialize};

/// Canonical operator admin level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminLevel {
    Super,
    AreaAccountant,
    CustomerService,
    TechnicalSupport,
}

impl AdminLevel {
    /// Resolve a raw level string (legacy records carry many synonyms) to a
    /// canonical level.
    ///
    /// Unrecognized or empty input falls back to `Super` — that is the
    /// documented contract of the legacy records this normalizer exists for.
    /// Every fallback is logged at warn so escalations stay visible.
    pub fn normalize(raw: &str) -> AdminLevel {
        let canonical = raw.trim().to_lowercase().replace(['-', ' '], "_");

        let level = match canonical.as_str() {
            "super" | "super_admin" | "superadmin" | "admin" | "administrator" | "owner"
            | "full_access" => Some(AdminLevel::Super),
            "area_accountant" | "accountant" | "regional_accountant" | "zone_accountant"
            | "area" => Some(AdminLevel::AreaAccountant),
            "customer_service" | "customer_support" | "customer_care" | "cs" | "support" => {
                Some(AdminLevel::CustomerService)
            }
            "technical_support" | "tech_support" | "technical" | "tech" | "it_support" | "it" => {
                Some(AdminLevel::TechnicalSupport)
            }
            _ => None,
        };

        match level {
            Some(level) => level,
            None => {
                tracing::warn!(raw, "unrecognized admin level, falling back to super");
                AdminLevel::Super
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AdminLevel::Super => "super",
            AdminLevel::AreaAccountant => "area_accountant",
            AdminLevel::CustomerService => "customer_service",
            AdminLevel::TechnicalSupport => "technical_support",
        }
    }
}

impl core::fmt::Display for AdminLevel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
