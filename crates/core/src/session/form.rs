//! Live forms and their calculation history.

use caisse_shared::types::{FormId, result_label};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ledger::{Ledger, Multiplier};

/// A reconciliation form being edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Form {
    /// Form identifier.
    pub id: FormId,
    /// Name of the owning site when the form was created.
    pub site: String,
    /// Editable field values.
    #[serde(flatten)]
    pub ledger: Ledger,
    /// Last result label, empty before the first calculation.
    #[serde(default)]
    pub result: String,
    /// Time of creation or of the last calculation.
    pub timestamp: DateTime<Utc>,
    /// Snapshots taken at each calculation, oldest first.
    #[serde(default)]
    pub calculation_history: Vec<HistorySnapshot>,
}

impl Form {
    /// Creates an empty form.
    #[must_use]
    pub fn new(site: impl Into<String>, multiplier: Multiplier) -> Self {
        Self {
            id: FormId::generate(),
            site: site.into(),
            ledger: Ledger::new(multiplier),
            result: String::new(),
            timestamp: Utc::now(),
            calculation_history: Vec::new(),
        }
    }

    /// Captures the current field values with a new result.
    #[must_use]
    pub fn snapshot(&self, result: impl Into<String>, timestamp: DateTime<Utc>) -> HistorySnapshot {
        HistorySnapshot {
            form_id: self.id,
            site: self.site.clone(),
            ledger: self.ledger.clone(),
            result: result.into(),
            timestamp,
        }
    }

    /// Loads a snapshot's field values and result. History is kept.
    pub fn restore(&mut self, snapshot: &HistorySnapshot) {
        self.ledger = snapshot.ledger.clone();
        self.result.clone_from(&snapshot.result);
        self.timestamp = snapshot.timestamp;
    }
}

/// Immutable record of a form at calculation time.
///
/// Snapshots carry no history of their own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistorySnapshot {
    /// Form the snapshot was taken from.
    pub form_id: FormId,
    /// Site name recorded on the form.
    pub site: String,
    /// Field values before settlement.
    #[serde(flatten)]
    pub ledger: Ledger,
    /// Result label computed from these values.
    pub result: String,
    /// Calculation time.
    pub timestamp: DateTime<Utc>,
}

impl HistorySnapshot {
    /// Returns true if the snapshot holds a non-zero result.
    #[must_use]
    pub fn has_result(&self) -> bool {
        !self.result.trim().is_empty() && self.result != result_label(Decimal::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::RetraitRow;

    #[test]
    fn test_new_form_is_empty() {
        let form = Form::new("Agence", Multiplier::One);
        assert_eq!(form.site, "Agence");
        assert_eq!(form.ledger.multiplier, Multiplier::One);
        assert!(form.result.is_empty());
        assert!(form.calculation_history.is_empty());
    }

    #[test]
    fn test_snapshot_and_restore() {
        let mut form = Form::new("Agence", Multiplier::default());
        form.ledger.solde_de_debut = "100".into();
        let snapshot = form.snapshot("Total: 101.0", Utc::now());
        assert_eq!(snapshot.form_id, form.id);

        form.ledger.solde_de_debut = "5".into();
        form.ledger.retrait_rows[0] = RetraitRow::new("Ali", "3", "OK");
        form.calculation_history.push(snapshot.clone());
        form.restore(&snapshot);

        assert_eq!(form.ledger.solde_de_debut, "100");
        assert_eq!(form.ledger.retrait_rows[0], RetraitRow::default());
        assert_eq!(form.result, "Total: 101.0");
        assert_eq!(form.calculation_history.len(), 1);
    }

    #[test]
    fn test_has_result() {
        let form = Form::new("Agence", Multiplier::default());
        assert!(form.snapshot("Total: 12.0", Utc::now()).has_result());
        assert!(!form.snapshot("Total: 0.0", Utc::now()).has_result());
        assert!(!form.snapshot("", Utc::now()).has_result());
    }

    #[test]
    fn test_form_json_is_flat() {
        let mut form = Form::new("Agence", Multiplier::default());
        let snapshot = form.snapshot("Total: 1.0", Utc::now());
        form.calculation_history.push(snapshot);
        let json = serde_json::to_value(&form).unwrap();
        assert_eq!(json["multiplier"], "1.1");
        assert!(json["creditRows"].is_array());
        assert!(json["calculationHistory"][0].get("calculationHistory").is_none());

        let back: Form = serde_json::from_value(json).unwrap();
        assert_eq!(back, form);
    }
}
