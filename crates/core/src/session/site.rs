//! Operating sites.

use caisse_shared::types::{SiteId, parse_result_label, saturating_sum};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::form::Form;
use crate::ledger::Multiplier;

/// Accent color shown for a site.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SiteColor {
    /// No accent.
    #[default]
    None,
    /// Blue.
    Blue,
    /// Green.
    Green,
    /// Yellow.
    Yellow,
    /// Purple.
    Purple,
    /// Red.
    Red,
}

/// Site activity statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteStatistics {
    /// Last form change or calculation.
    pub last_updated: DateTime<Utc>,
}

/// A named group of forms for one operating location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    /// Site identifier.
    pub id: SiteId,
    /// Display name.
    pub name: String,
    /// Accent color.
    #[serde(default)]
    pub color: SiteColor,
    /// Forms, never empty.
    pub forms: Vec<Form>,
    /// Activity statistics.
    pub statistics: SiteStatistics,
}

impl Site {
    /// Creates a site holding one empty form.
    #[must_use]
    pub fn new(name: impl Into<String>, multiplier: Multiplier) -> Self {
        let name = name.into();
        let form = Form::new(name.clone(), multiplier);
        Self {
            id: SiteId::generate(),
            name,
            color: SiteColor::None,
            forms: vec![form],
            statistics: SiteStatistics {
                last_updated: Utc::now(),
            },
        }
    }

    /// Sum of the readable form results.
    #[must_use]
    pub fn total(&self) -> Decimal {
        saturating_sum(
            self.forms
                .iter()
                .filter_map(|form| parse_result_label(&form.result)),
        )
    }

    /// Records activity now.
    pub fn touch(&mut self) {
        self.statistics.last_updated = Utc::now();
    }
}
