//! Session service owning sites, forms and the current selection.

use caisse_shared::AppConfig;
use caisse_shared::types::saturating_sum;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::error::SessionError;
use super::form::{Form, HistorySnapshot};
use super::site::{Site, SiteColor};
use crate::ledger::{Calculation, Multiplier, TotalCalculator};
use crate::settlement::{ExcessCredit, SettlementEngine, SettlementSummary};
use crate::storage::{KeyValueStore, StorageError};

const SITES_KEY: &str = "sites";
const SITE_INDEX_KEY: &str = "current-site-index";
const FORM_INDEX_KEY: &str = "current-form-index";

/// Outcome of a calculation on the current form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationReport {
    /// Totals and warnings.
    pub calculation: Calculation,
    /// Result label stored on the form.
    pub result: String,
    /// Settlement applied after the calculation.
    pub settlement: SettlementSummary,
}

/// Persisted store keys.
#[derive(Debug, Clone)]
struct StoreKeys {
    sites: String,
    site_index: String,
    form_index: String,
}

/// A calculator session over a key-value store.
///
/// Every mutation is persisted before returning. The current site and form
/// indexes always point at an existing form.
#[derive(Debug)]
pub struct Session<S: KeyValueStore> {
    store: S,
    keys: StoreKeys,
    default_multiplier: Multiplier,
    default_site_name: String,
    new_site_prefix: String,
    sites: Vec<Site>,
    current_site: usize,
    current_form: usize,
}

impl<S: KeyValueStore> Session<S> {
    /// Opens a session from `store`.
    ///
    /// Missing or unreadable sites fall back to one default site with one
    /// empty form. Out-of-range indexes fall back to 0.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` for an unknown default multiplier and
    /// `Storage` if the store cannot be read.
    pub fn open(store: S, config: &AppConfig) -> Result<Self, SessionError> {
        let default_multiplier: Multiplier = config
            .calculator
            .default_multiplier
            .parse()
            .map_err(|e| SessionError::InvalidConfig(format!("default_multiplier: {e}")))?;

        let keys = StoreKeys {
            sites: config.storage.key(SITES_KEY),
            site_index: config.storage.key(SITE_INDEX_KEY),
            form_index: config.storage.key(FORM_INDEX_KEY),
        };

        let mut sites = Self::load_sites(&store, &keys.sites)?;
        if sites.is_empty() {
            sites.push(Site::new(
                config.calculator.default_site_name.clone(),
                default_multiplier,
            ));
        }
        for site in &mut sites {
            if site.forms.is_empty() {
                site.forms.push(Form::new(site.name.clone(), default_multiplier));
            }
        }

        let mut current_site = Self::load_index(&store, &keys.site_index)?;
        if current_site >= sites.len() {
            current_site = 0;
        }
        let mut current_form = Self::load_index(&store, &keys.form_index)?;
        if current_form >= sites[current_site].forms.len() {
            current_form = 0;
        }

        info!(
            sites = sites.len(),
            current_site, current_form, "Session opened"
        );

        Ok(Self {
            store,
            keys,
            default_multiplier,
            default_site_name: config.calculator.default_site_name.clone(),
            new_site_prefix: config.calculator.new_site_prefix.clone(),
            sites,
            current_site,
            current_form,
        })
    }

    fn load_sites(store: &S, key: &str) -> Result<Vec<Site>, SessionError> {
        let Some(raw) = store.load(key)? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str(&raw) {
            Ok(sites) => Ok(sites),
            Err(e) => {
                warn!(key, error = %e, "Stored sites unreadable, starting fresh");
                Ok(Vec::new())
            }
        }
    }

    fn load_index(store: &S, key: &str) -> Result<usize, SessionError> {
        let Some(raw) = store.load(key)? else {
            return Ok(0);
        };
        match raw.trim().parse() {
            Ok(index) => Ok(index),
            Err(e) => {
                warn!(key, error = %e, "Stored index unreadable, using 0");
                Ok(0)
            }
        }
    }

    fn persist(&mut self) -> Result<(), SessionError> {
        let sites = serde_json::to_string(&self.sites).map_err(StorageError::from)?;
        self.store.save(&self.keys.sites, &sites)?;
        self.store
            .save(&self.keys.site_index, &self.current_site.to_string())?;
        self.store
            .save(&self.keys.form_index, &self.current_form.to_string())?;
        debug!(sites = self.sites.len(), "Session persisted");
        Ok(())
    }

    // ========== Accessors ==========

    /// All sites, the default site first.
    #[must_use]
    pub fn sites(&self) -> &[Site] {
        &self.sites
    }

    /// Index of the current site.
    #[must_use]
    pub fn current_site_index(&self) -> usize {
        self.current_site
    }

    /// Index of the current form within the current site.
    #[must_use]
    pub fn current_form_index(&self) -> usize {
        self.current_form
    }

    /// The current site.
    #[must_use]
    pub fn current_site(&self) -> &Site {
        &self.sites[self.current_site]
    }

    /// The current form.
    #[must_use]
    pub fn current_form(&self) -> &Form {
        &self.current_site().forms[self.current_form]
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Closes the session and hands back the store.
    #[must_use]
    pub fn into_store(self) -> S {
        self.store
    }

    fn current_site_mut(&mut self) -> &mut Site {
        &mut self.sites[self.current_site]
    }

    fn site_mut(&mut self, index: usize) -> Result<&mut Site, SessionError> {
        self.sites
            .get_mut(index)
            .ok_or(SessionError::SiteNotFound(index))
    }

    // ========== Form editing ==========

    /// Applies `edit` to the current form and persists.
    ///
    /// # Errors
    ///
    /// Returns any error from `edit`, or `Storage` if saving fails.
    pub fn update_form<T, F>(&mut self, edit: F) -> Result<T, SessionError>
    where
        F: FnOnce(&mut Form) -> Result<T, SessionError>,
    {
        let index = self.current_form;
        let value = edit(&mut self.current_site_mut().forms[index])?;
        self.persist()?;
        Ok(value)
    }

    /// Calculates the current form, records a history snapshot and settles
    /// client credits.
    ///
    /// `confirm` is asked once per excess credit. When the opening balance
    /// is invalid nothing changes: no result, no history, no settlement.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for an invalid opening balance, or `Storage` if
    /// saving fails.
    pub fn calculate<F>(&mut self, confirm: F) -> Result<CalculationReport, SessionError>
    where
        F: FnMut(&ExcessCredit) -> bool,
    {
        let calculation = match TotalCalculator::compute(&self.current_form().ledger) {
            Ok(calculation) => calculation,
            Err(e) => {
                warn!(field = %e.field, error = %e.source, "Calculation aborted");
                return Err(e.into());
            }
        };
        let result = calculation.result_label();
        let now = Utc::now();

        let index = self.current_form;
        let site = self.current_site_mut();
        site.statistics.last_updated = now;
        let form = &mut site.forms[index];

        let snapshot = form.snapshot(result.clone(), now);
        form.calculation_history.push(snapshot);
        form.result.clone_from(&result);
        form.timestamp = now;

        let settlement = SettlementEngine::settle(&mut form.ledger, confirm)?;
        self.persist()?;

        info!(
            site = self.current_site,
            form = self.current_form,
            result = %result,
            warnings = calculation.warnings.len(),
            "Calculation complete"
        );

        Ok(CalculationReport {
            calculation,
            result,
            settlement,
        })
    }

    // ========== Forms ==========

    /// Adds an empty form to the current site and selects it.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if saving fails.
    pub fn add_form(&mut self) -> Result<&Form, SessionError> {
        let multiplier = self.default_multiplier;
        let site = self.current_site_mut();
        site.forms.push(Form::new(site.name.clone(), multiplier));
        site.touch();
        let last = site.forms.len() - 1;
        self.current_form = last;
        self.persist()?;
        info!(site = self.current_site, form = self.current_form, "Form added");
        Ok(self.current_form())
    }

    /// Deletes the current form. The sole form of a site is replaced by an
    /// empty one instead; otherwise the previous form becomes current.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if saving fails.
    pub fn delete_form(&mut self) -> Result<(), SessionError> {
        let multiplier = self.default_multiplier;
        let index = self.current_form;
        let site = self.current_site_mut();
        let selected = if site.forms.len() == 1 {
            site.forms[0] = Form::new(site.name.clone(), multiplier);
            0
        } else {
            site.forms.remove(index);
            index.saturating_sub(1)
        };
        site.touch();
        self.current_form = selected;
        self.persist()?;
        info!(site = self.current_site, deleted = index, "Form deleted");
        Ok(())
    }

    /// Selects the next form. Returns false when already on the last one.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if saving fails.
    pub fn next_form(&mut self) -> Result<bool, SessionError> {
        if self.current_form + 1 >= self.current_site().forms.len() {
            return Ok(false);
        }
        self.current_form += 1;
        self.persist()?;
        Ok(true)
    }

    /// Selects the previous form. Returns false when already on the first one.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if saving fails.
    pub fn previous_form(&mut self) -> Result<bool, SessionError> {
        if self.current_form == 0 {
            return Ok(false);
        }
        self.current_form -= 1;
        self.persist()?;
        Ok(true)
    }

    /// Selects a form of the current site.
    ///
    /// # Errors
    ///
    /// Returns `FormNotFound` for an out-of-range index, or `Storage` if
    /// saving fails.
    pub fn select_form(&mut self, index: usize) -> Result<(), SessionError> {
        if index >= self.current_site().forms.len() {
            return Err(SessionError::FormNotFound(index));
        }
        self.current_form = index;
        self.persist()
    }

    // ========== Sites ==========

    /// Adds a site named `"{prefix} {n}"` and selects it.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if saving fails.
    pub fn add_site(&mut self) -> Result<&Site, SessionError> {
        let name = format!("{} {}", self.new_site_prefix, self.sites.len() + 1);
        self.sites.push(Site::new(name, self.default_multiplier));
        self.current_site = self.sites.len() - 1;
        self.current_form = 0;
        self.persist()?;
        info!(site = self.current_site, name = %self.current_site().name, "Site added");
        Ok(self.current_site())
    }

    /// Selects a site and its first form.
    ///
    /// # Errors
    ///
    /// Returns `SiteNotFound` for an out-of-range index, or `Storage` if
    /// saving fails.
    pub fn select_site(&mut self, index: usize) -> Result<(), SessionError> {
        if index >= self.sites.len() {
            return Err(SessionError::SiteNotFound(index));
        }
        self.current_site = index;
        self.current_form = 0;
        self.persist()
    }

    /// Renames a site. The name is trimmed.
    ///
    /// # Errors
    ///
    /// Returns `EmptySiteName` for a blank name, `SiteNotFound` for an
    /// out-of-range index, or `Storage` if saving fails.
    pub fn rename_site(&mut self, index: usize, name: &str) -> Result<(), SessionError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SessionError::EmptySiteName);
        }
        let site = self.site_mut(index)?;
        site.name = name.to_string();
        site.touch();
        self.persist()
    }

    /// Sets a site's accent color.
    ///
    /// # Errors
    ///
    /// Returns `SiteNotFound` for an out-of-range index, or `Storage` if
    /// saving fails.
    pub fn set_site_color(&mut self, index: usize, color: SiteColor) -> Result<(), SessionError> {
        self.site_mut(index)?.color = color;
        self.persist()
    }

    /// Deletes a site. The first site cannot be deleted.
    ///
    /// When the current site is at or after the deleted one, the selection
    /// moves back by one and the first form of that site becomes current.
    ///
    /// # Errors
    ///
    /// Returns `DefaultSiteProtected` for index 0, `SiteNotFound` for an
    /// out-of-range index, or `Storage` if saving fails.
    pub fn delete_site(&mut self, index: usize) -> Result<(), SessionError> {
        if index == 0 {
            warn!(default_site = %self.default_site_name, "Refused to delete the default site");
            return Err(SessionError::DefaultSiteProtected);
        }
        if index >= self.sites.len() {
            return Err(SessionError::SiteNotFound(index));
        }

        let removed = self.sites.remove(index);
        if self.current_site >= index {
            self.current_site -= 1;
            self.current_form = 0;
        }
        self.persist()?;
        info!(deleted = index, name = %removed.name, "Site deleted");
        Ok(())
    }

    // ========== History ==========

    /// Snapshots of the current form with a non-zero result, with their
    /// index in the full history.
    pub fn history_with_results(&self) -> impl Iterator<Item = (usize, &HistorySnapshot)> + '_ {
        self.current_form()
            .calculation_history
            .iter()
            .enumerate()
            .filter(|(_, snapshot)| snapshot.has_result())
    }

    /// Loads a history snapshot into the current form.
    ///
    /// # Errors
    ///
    /// Returns `SnapshotNotFound` for an out-of-range index, or `Storage`
    /// if saving fails.
    pub fn restore_snapshot(&mut self, index: usize) -> Result<(), SessionError> {
        let snapshot = self
            .current_form()
            .calculation_history
            .get(index)
            .cloned()
            .ok_or(SessionError::SnapshotNotFound(index))?;
        self.update_form(|form| {
            form.restore(&snapshot);
            Ok(())
        })?;
        info!(snapshot = index, result = %snapshot.result, "Snapshot restored");
        Ok(())
    }

    // ========== Statistics ==========

    /// Sum of all site totals.
    #[must_use]
    pub fn total_all_sites(&self) -> Decimal {
        saturating_sum(self.sites.iter().map(Site::total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{CreditRow, RetraitRow, RowKind};
    use crate::storage::MemoryStore;
    use rust_decimal_macros::dec;

    fn session() -> Session<MemoryStore> {
        Session::open(MemoryStore::new(), &AppConfig::default()).unwrap()
    }

    #[test]
    fn test_open_empty_store_creates_default_site() {
        let session = session();
        assert_eq!(session.sites().len(), 1);
        assert_eq!(session.current_site().name, "Default Site");
        assert_eq!(session.current_site().forms.len(), 1);
        assert_eq!(session.current_form().ledger.multiplier, Multiplier::OnePointOne);
    }

    #[test]
    fn test_open_rejects_unknown_multiplier() {
        let mut config = AppConfig::default();
        config.calculator.default_multiplier = "2".into();
        let err = Session::open(MemoryStore::new(), &config).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CONFIG");
    }

    #[test]
    fn test_open_recovers_from_corrupt_state() {
        let mut store = MemoryStore::new();
        store.save("calculator-sites", "{not json").unwrap();
        store.save("calculator-current-site-index", "7").unwrap();
        store.save("calculator-current-form-index", "x").unwrap();
        let session = Session::open(store, &AppConfig::default()).unwrap();
        assert_eq!(session.sites().len(), 1);
        assert_eq!(session.current_site_index(), 0);
        assert_eq!(session.current_form_index(), 0);
    }

    #[test]
    fn test_update_form_persists() {
        let mut session = session();
        session
            .update_form(|form| {
                form.ledger.solde_de_debut = "100".into();
                Ok(())
            })
            .unwrap();
        let saved = session.store().load("calculator-sites").unwrap().unwrap();
        assert!(saved.contains("\"soldeDeDebut\":\"100\""));
    }

    #[test]
    fn test_update_form_propagates_row_errors() {
        let mut session = session();
        let err = session
            .update_form(|form| {
                form.ledger.credit_row_mut(4)?.set_details("1");
                Ok(())
            })
            .unwrap_err();
        assert_eq!(err.error_code(), "ROW_NOT_FOUND");
    }

    #[test]
    fn test_calculate_records_history_and_settles() {
        let mut session = session();
        session
            .update_form(|form| {
                let ledger = &mut form.ledger;
                ledger.solde_de_debut = "100".into();
                ledger.credit_rows[0] = CreditRow::new("Ali", "50");
                ledger.retrait_rows[0] = RetraitRow::new("Ali", "50", "OK");
                Ok(())
            })
            .unwrap();

        let report = session.calculate(|_| true).unwrap();
        // (100 + 50) * 1.1 - 50 - 50
        assert_eq!(report.result, "Total: 65.0");
        assert_eq!(report.settlement.rows_settled, 1);

        let form = session.current_form();
        assert_eq!(form.result, "Total: 65.0");
        assert_eq!(form.calculation_history.len(), 1);
        // The snapshot holds the values from before settlement.
        assert_eq!(form.calculation_history[0].ledger.credit_rows[0].details(), "50");
        assert_eq!(form.ledger.credit_rows[0].total_client(), Decimal::ZERO);
    }

    #[test]
    fn test_calculate_without_opening_balance_changes_nothing() {
        let mut session = session();
        let before = session.current_form().clone();
        let err = session.calculate(|_| true).unwrap_err();
        assert!(matches!(err, SessionError::Validation(_)));
        assert_eq!(session.current_form(), &before);
        assert!(session.store().is_empty());
    }

    #[test]
    fn test_form_navigation() {
        let mut session = session();
        session.add_form().unwrap();
        session.add_form().unwrap();
        assert_eq!(session.current_form_index(), 2);
        assert!(!session.next_form().unwrap());
        assert!(session.previous_form().unwrap());
        assert_eq!(session.current_form_index(), 1);
        session.select_form(0).unwrap();
        assert!(!session.previous_form().unwrap());
        assert!(matches!(
            session.select_form(3),
            Err(SessionError::FormNotFound(3))
        ));
    }

    #[test]
    fn test_delete_form_moves_selection_back() {
        let mut session = session();
        session.add_form().unwrap();
        let second = session.current_form().id;
        session.add_form().unwrap();
        session.delete_form().unwrap();
        assert_eq!(session.current_site().forms.len(), 2);
        assert_eq!(session.current_form_index(), 1);
        assert_eq!(session.current_form().id, second);
    }

    #[test]
    fn test_delete_sole_form_replaces_it() {
        let mut session = session();
        let original = session.current_form().id;
        session
            .update_form(|form| {
                form.ledger.add_row(RowKind::Depense);
                Ok(())
            })
            .unwrap();
        session.delete_form().unwrap();
        assert_eq!(session.current_site().forms.len(), 1);
        assert_ne!(session.current_form().id, original);
        assert_eq!(session.current_form().ledger.row_count(RowKind::Depense), 1);
    }

    #[test]
    fn test_site_lifecycle() {
        let mut session = session();
        assert_eq!(session.add_site().unwrap().name, "New Site 2");
        assert_eq!(session.add_site().unwrap().name, "New Site 3");
        assert_eq!(session.current_site_index(), 2);

        session.rename_site(1, "  Agence Nord ").unwrap();
        assert_eq!(session.sites()[1].name, "Agence Nord");
        assert!(matches!(
            session.rename_site(1, "   "),
            Err(SessionError::EmptySiteName)
        ));

        session.set_site_color(2, SiteColor::Green).unwrap();
        assert_eq!(session.sites()[2].color, SiteColor::Green);

        session.delete_site(1).unwrap();
        assert_eq!(session.sites().len(), 2);
        assert_eq!(session.current_site_index(), 1);
        assert_eq!(session.current_site().color, SiteColor::Green);
    }

    #[test]
    fn test_default_site_cannot_be_deleted() {
        let mut session = session();
        assert!(matches!(
            session.delete_site(0),
            Err(SessionError::DefaultSiteProtected)
        ));
        assert!(matches!(
            session.delete_site(5),
            Err(SessionError::SiteNotFound(5))
        ));
    }

    #[test]
    fn test_select_site_resets_form_index() {
        let mut session = session();
        session.add_form().unwrap();
        session.add_site().unwrap();
        session.select_site(0).unwrap();
        assert_eq!(session.current_form_index(), 0);
        assert!(session.select_site(9).is_err());
    }

    #[test]
    fn test_history_and_restore() {
        let mut session = session();
        session
            .update_form(|form| {
                form.ledger.solde_de_debut = "10".into();
                Ok(())
            })
            .unwrap();
        session.calculate(|_| true).unwrap();
        session
            .update_form(|form| {
                form.ledger.solde_de_debut = "20".into();
                Ok(())
            })
            .unwrap();
        session.calculate(|_| true).unwrap();

        let listed: Vec<usize> = session.history_with_results().map(|(i, _)| i).collect();
        assert_eq!(listed, vec![0, 1]);

        session.restore_snapshot(0).unwrap();
        let form = session.current_form();
        assert_eq!(form.ledger.solde_de_debut, "10");
        assert_eq!(form.result, "Total: 11.0");
        assert_eq!(form.calculation_history.len(), 2);

        assert!(matches!(
            session.restore_snapshot(5),
            Err(SessionError::SnapshotNotFound(5))
        ));
    }

    #[test]
    fn test_total_all_sites() {
        let mut session = session();
        session
            .update_form(|form| {
                form.ledger.solde_de_debut = "10".into();
                Ok(())
            })
            .unwrap();
        session.calculate(|_| true).unwrap();
        session.add_site().unwrap();
        session
            .update_form(|form| {
                form.ledger.solde_de_debut = "100".into();
                form.ledger.multiplier = Multiplier::One;
                Ok(())
            })
            .unwrap();
        session.calculate(|_| true).unwrap();
        assert_eq!(session.total_all_sites(), dec!(111));
    }
}
