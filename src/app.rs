// 🗂️ Dashboard Controller
//
// Owns the whole application state. Every edit goes through a method here,
// which validates, mutates, persists (where the data is stored) and pushes a
// notification. Calculators only ever see immutable snapshots of this state.

use crate::auth::Session;
use crate::calc::{
    calculate_mortgage, calculate_property_metrics, calculate_repair_roi, MortgageBreakdown,
    PropertyMetrics, Recommendation, RecommendationEngine, RepairRoi,
};
use crate::config::{Config, DemoAccount, NotificationConfig};
use crate::db::{LocalStore, StorageResult};
use crate::entities::{
    recent_clients, sample_comparables, ClientIntake, ClientRecord, ComparableListing,
    FeatureConditions, MortgageField, MortgageParameters, PhotoGallery, PropertyRecord,
    RepairBudgetMap, RepairCategoryTable, VersionHistory, VersionSnapshot,
};
use crate::error::{AuthError, FormErrors, InputError, PhotoError};
use crate::export::{write_comparables_csv, ReportBundle};
use crate::mls::{merge_comparables, MlsUpdate};
use crate::validation::{format_thousands, round_half_up};
use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Budgets above this multiple of the category maximum are accepted with a warning.
pub const BUDGET_WARNING_FACTOR: f64 = 1.2;

pub const CSV_EXPORT_FILE: &str = "comparables_export.csv";

// ============================================================================
// TABS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Tab {
    #[default]
    Overview,
    Analysis,
    Comparables,
    Trends,
    CmaReport,
    Recommendations,
    Mortgage,
    ClientEntry,
    Findings,
}

impl Tab {
    pub const ALL: [Tab; 9] = [
        Tab::Overview,
        Tab::Analysis,
        Tab::Comparables,
        Tab::Trends,
        Tab::CmaReport,
        Tab::Recommendations,
        Tab::Mortgage,
        Tab::ClientEntry,
        Tab::Findings,
    ];

    pub fn index(&self) -> usize {
        Tab::ALL.iter().position(|t| t == self).unwrap_or(0)
    }

    pub fn from_index(index: usize) -> Option<Tab> {
        Tab::ALL.get(index).copied()
    }

    pub fn next(&self) -> Self {
        Tab::ALL[(self.index() + 1) % Tab::ALL.len()]
    }

    pub fn previous(&self) -> Self {
        Tab::ALL[(self.index() + Tab::ALL.len() - 1) % Tab::ALL.len()]
    }

    pub fn title(&self) -> &'static str {
        match self {
            Tab::Overview => "Overview",
            Tab::Analysis => "Analysis",
            Tab::Comparables => "Comparables",
            Tab::Trends => "Trends",
            Tab::CmaReport => "CMA Report",
            Tab::Recommendations => "Recommendations",
            Tab::Mortgage => "Mortgage",
            Tab::ClientEntry => "Client Entry",
            Tab::Findings => "Findings",
        }
    }
}

// ============================================================================
// NOTIFICATIONS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
    pub expires_at: DateTime<Utc>,
}

impl Notification {
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

// ============================================================================
// STATE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardState {
    pub property: PropertyRecord,
    pub comparables: Vec<ComparableListing>,
    pub repair_budgets: RepairBudgetMap,
    pub mortgage: MortgageParameters,
    pub clients: Vec<ClientRecord>,
    pub current_client_id: Option<String>,
    pub versions: VersionHistory,
    pub photos: PhotoGallery,
    pub findings: String,
    pub executive_summary: Option<String>,
    pub active_tab: Tab,
}

impl DashboardState {
    pub fn new(table: &RepairCategoryTable) -> Self {
        DashboardState {
            property: PropertyRecord::sample(),
            comparables: sample_comparables(),
            repair_budgets: RepairBudgetMap::zeroed(table),
            mortgage: MortgageParameters::default(),
            clients: Vec::new(),
            current_client_id: None,
            versions: VersionHistory::new(),
            photos: PhotoGallery::default(),
            findings: String::new(),
            executive_summary: None,
            active_tab: Tab::Overview,
        }
    }
}

// ============================================================================
// DASHBOARD
// ============================================================================

pub struct Dashboard {
    state: DashboardState,
    session: Session,
    table: RepairCategoryTable,
    engine: RecommendationEngine,
    store: LocalStore,
    accounts: Vec<DemoAccount>,
    toast: NotificationConfig,
    notifications: Vec<Notification>,
    last_recommendation: Option<Recommendation>,
}

impl Dashboard {
    /// Open the on-disk store named by `config` and restore persisted data.
    pub fn open(config: &Config) -> StorageResult<Self> {
        let store = LocalStore::open(&config.database_path())?;
        Dashboard::with_store(store, config)
    }

    pub fn in_memory(config: &Config) -> StorageResult<Self> {
        Dashboard::with_store(LocalStore::open_in_memory()?, config)
    }

    pub fn with_store(store: LocalStore, config: &Config) -> StorageResult<Self> {
        let table = RepairCategoryTable::standard();
        let mut state = DashboardState::new(&table);

        state.clients = store.load_clients()?;
        state.versions = store.load_versions()?;
        state.photos = PhotoGallery::from_photos(store.load_photos()?);
        let (authenticated, email) = store.load_session()?;

        info!(
            clients = state.clients.len(),
            versions = state.versions.len(),
            photos = state.photos.len(),
            "dashboard state restored"
        );

        Ok(Dashboard {
            state,
            session: Session::restored(authenticated, email),
            engine: RecommendationEngine::new(table.clone()),
            table,
            store,
            accounts: config.auth.accounts.clone(),
            toast: config.notifications.clone(),
            notifications: Vec::new(),
            last_recommendation: None,
        })
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    pub fn property(&self) -> &PropertyRecord {
        &self.state.property
    }

    pub fn comparables(&self) -> &[ComparableListing] {
        &self.state.comparables
    }

    pub fn budgets(&self) -> &RepairBudgetMap {
        &self.state.repair_budgets
    }

    pub fn mortgage(&self) -> &MortgageParameters {
        &self.state.mortgage
    }

    pub fn category_table(&self) -> &RepairCategoryTable {
        &self.table
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    pub fn last_recommendation(&self) -> Option<&Recommendation> {
        self.last_recommendation.as_ref()
    }

    pub fn versions(&self) -> &VersionHistory {
        &self.state.versions
    }

    pub fn recent_versions(&self) -> Vec<&VersionSnapshot> {
        self.state.versions.recent()
    }

    pub fn recent_clients(&self) -> Vec<&ClientRecord> {
        recent_clients(&self.state.clients)
    }

    pub fn current_client(&self) -> Option<&ClientRecord> {
        let id = self.state.current_client_id.as_deref()?;
        self.state.clients.iter().find(|c| c.id == id)
    }

    pub fn photos(&self) -> &PhotoGallery {
        &self.state.photos
    }

    // ========================================================================
    // CALCULATIONS
    // ========================================================================

    pub fn metrics(&self) -> PropertyMetrics {
        calculate_property_metrics(
            &self.state.comparables,
            &self.state.property,
            self.state.mortgage.loan_amount,
        )
    }

    pub fn mortgage_breakdown(&self) -> MortgageBreakdown {
        calculate_mortgage(&self.state.mortgage)
    }

    pub fn repair_roi(&self) -> RepairRoi {
        calculate_repair_roi(
            &self.state.repair_budgets,
            &self.table,
            self.state.property.current_value,
        )
    }

    /// Apply the condition rules to the budgets and regenerate the summary.
    pub fn run_recommendations(&mut self, now: DateTime<Utc>) -> &Recommendation {
        let recommendation =
            self.engine
                .run(&self.state.property, &mut self.state.repair_budgets, now);
        self.state.executive_summary = Some(recommendation.summary.clone());
        self.notify_success("Analysis completed successfully");
        self.last_recommendation.insert(recommendation)
    }

    // ========================================================================
    // PROPERTY EDITS
    // ========================================================================

    /// Returns true when the change should trigger an MLS refresh.
    pub fn set_address(&mut self, address: &str) -> bool {
        let address = address.trim();
        if self.state.property.address == address {
            return false;
        }
        self.state.property.address = address.to_string();
        debug!(address, "property address changed");
        self.session.is_authenticated() && !address.is_empty()
    }

    pub fn set_conditions(&mut self, conditions: FeatureConditions) {
        self.state.property.conditions = conditions;
    }

    pub fn set_findings(&mut self, findings: impl Into<String>) {
        self.state.findings = findings.into();
    }

    /// Validated budget write. Nothing changes on error.
    pub fn update_repair_budget(&mut self, category: &str, amount: f64) -> Result<(), InputError> {
        let result = self.try_update_repair_budget(category, amount);
        if let Err(err) = &result {
            self.notify_error(err.to_string());
        }
        result
    }

    fn try_update_repair_budget(&mut self, category: &str, amount: f64) -> Result<(), InputError> {
        if amount.is_nan() || amount < 0.0 {
            return Err(InputError::NegativeBudget);
        }
        let max_budget = self
            .table
            .get(category)
            .map(|c| c.max_budget)
            .ok_or_else(|| InputError::UnknownCategory(category.to_string()))?;

        self.state.repair_budgets.set(category, amount);

        if amount > max_budget * BUDGET_WARNING_FACTOR {
            self.notify_warning(format!(
                "Budget for {} seems unusually high. Maximum recommended: ${}",
                category,
                format_thousands(max_budget as i64)
            ));
        }
        Ok(())
    }

    pub fn reset_budgets(&mut self) {
        self.state.repair_budgets = RepairBudgetMap::zeroed(&self.table);
        self.notify_success("All budgets reset to zero");
    }

    /// Half of every category maximum.
    pub fn apply_recommended_budgets(&mut self) {
        self.state.repair_budgets = self
            .table
            .iter()
            .map(|c| (c.kind.key().to_string(), round_half_up(c.max_budget * 0.5)))
            .collect();
        self.notify_success("Applied recommended budgets");
    }

    /// 70% of the maximum for categories returning more than 1.5×, zero elsewhere.
    pub fn apply_high_roi_budgets(&mut self) {
        self.state.repair_budgets = self
            .table
            .iter()
            .map(|c| {
                let amount = if c.roi > 1.5 { round_half_up(c.max_budget * 0.7) } else { 0.0 };
                (c.kind.key().to_string(), amount)
            })
            .collect();
        self.notify_success("Applied high-ROI strategy");
    }

    pub fn update_mortgage(&mut self, field: MortgageField) -> Result<(), InputError> {
        let result = self.state.mortgage.apply(field);
        if let Err(err) = &result {
            self.notify_error(err.to_string());
        }
        result
    }

    // ========================================================================
    // MLS
    // ========================================================================

    /// Merge a fetch result. Results for an address other than the current
    /// one are dropped. Returns true when the comparables were replaced.
    pub fn apply_mls_update(&mut self, update: MlsUpdate) -> bool {
        if update.address != self.state.property.address {
            debug!(stale = %update.address, "ignoring MLS result for previous address");
            return false;
        }

        match update.result {
            Ok(listings) => {
                let count = listings.len();
                self.state.comparables = merge_comparables(&self.state.comparables, listings);
                self.notify_success(format!("Found {} new comparable properties", count));
                true
            }
            Err(err) => {
                self.notify_error(format!("MLS data fetch failed: {}", err));
                false
            }
        }
    }

    // ========================================================================
    // VERSIONS
    // ========================================================================

    /// Snapshot the property and budgets. Returns the new version id.
    pub fn save_version(&mut self) -> String {
        let snapshot = VersionSnapshot::capture(
            &self.state.property,
            &self.state.repair_budgets,
            self.state.current_client_id.clone(),
        );
        let id = snapshot.id.clone();
        let evicted = self.state.versions.push(snapshot);

        self.persist(|store, state| store.save_versions(&state.versions));
        if evicted.is_some() {
            self.notify_success("Version saved (oldest version removed due to limit)");
        } else {
            self.notify_success("Version saved successfully");
        }
        info!(id = %id, total = self.state.versions.len(), "version saved");
        id
    }

    pub fn restore_version(&mut self, id: &str) -> Result<(), InputError> {
        let Some(snapshot) = self.state.versions.get(id) else {
            let err = InputError::VersionNotFound(id.to_string());
            self.notify_error(err.to_string());
            return Err(err);
        };

        let message = format!(
            "Loaded version from {}",
            snapshot.timestamp.format("%Y-%m-%d %H:%M:%S")
        );
        self.state.property = snapshot.property_data.clone();
        self.state.repair_budgets = snapshot.repair_budgets.clone();
        self.notify_success(message);
        Ok(())
    }

    pub fn delete_version(&mut self, id: &str) -> Result<(), InputError> {
        if self.state.versions.remove(id).is_none() {
            let err = InputError::VersionNotFound(id.to_string());
            self.notify_error(err.to_string());
            return Err(err);
        }
        self.persist(|store, state| store.save_versions(&state.versions));
        self.notify_success("Version deleted");
        Ok(())
    }

    // ========================================================================
    // CLIENTS
    // ========================================================================

    /// Validate and store a new client intake. Returns the client id.
    pub fn add_client(&mut self, intake: ClientIntake) -> Result<String, FormErrors> {
        let client = match ClientRecord::from_intake(intake) {
            Ok(client) => client,
            Err(errors) => {
                self.notify_error("Please correct the errors in the form");
                return Err(errors);
            }
        };

        let id = client.id.clone();
        let message = format!("Client {} saved successfully!", client.name());
        self.state.clients.push(client);
        self.persist(|store, state| store.save_clients(&state.clients));
        self.notify_success(message);
        Ok(id)
    }

    pub fn load_client(&mut self, id: &str) -> Result<(), InputError> {
        let Some(client) = self.state.clients.iter().find(|c| c.id == id) else {
            let err = InputError::ClientNotFound(id.to_string());
            self.notify_error(err.to_string());
            return Err(err);
        };

        client.apply_to_property(&mut self.state.property);
        let message = format!("Loaded data for {}", client.name());
        self.state.current_client_id = Some(id.to_string());
        self.notify_success(message);
        Ok(())
    }

    // ========================================================================
    // PHOTOS
    // ========================================================================

    pub fn add_photo(&mut self, name: &str, mime_type: &str, bytes: &[u8]) -> Result<String, PhotoError> {
        let id = match self.state.photos.add(name, mime_type, bytes) {
            Ok(photo) => photo.id.clone(),
            Err(err) => {
                self.notify_error(err.to_string());
                return Err(err);
            }
        };
        self.persist(|store, state| store.save_photos(state.photos.photos()));
        self.notify_success("Photo uploaded successfully");
        Ok(id)
    }

    pub fn remove_photo(&mut self, id: &str) -> Result<(), PhotoError> {
        if let Err(err) = self.state.photos.remove(id) {
            self.notify_error(err.to_string());
            return Err(err);
        }
        self.persist(|store, state| store.save_photos(state.photos.photos()));
        self.notify_success("Photo deleted");
        Ok(())
    }

    pub fn clear_photos(&mut self) {
        self.state.photos = PhotoGallery::default();
        self.persist(|store, state| store.save_photos(state.photos.photos()));
        self.notify_success("All photos deleted");
    }

    // ========================================================================
    // SESSION
    // ========================================================================

    pub fn login(&mut self, email: &str, password: &str) -> Result<(), AuthError> {
        if let Err(err) = self.session.login(&self.accounts, email, password) {
            self.notify_error(err.to_string());
            return Err(err);
        }
        let email = self.session.user_email.clone().unwrap_or_default();
        self.persist(|store, _| store.save_session(&email));
        self.notify_success(format!("Welcome back, {}!", email));
        Ok(())
    }

    pub fn logout(&mut self) {
        self.session.logout();
        self.persist(|store, _| store.clear_session());
        self.notify_success("Logged out successfully");
    }

    // ========================================================================
    // EXPORTS
    // ========================================================================

    pub fn report_bundle(&self, now: DateTime<Utc>) -> ReportBundle {
        ReportBundle::build(
            &self.state.property,
            &self.metrics(),
            &self.repair_roi(),
            &self.state.comparables,
            now,
        )
    }

    pub fn export_csv(&mut self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(CSV_EXPORT_FILE);
        match write_comparables_csv(&path, &self.state.comparables) {
            Ok(()) => {
                self.notify_success("Comparables exported to CSV");
                Ok(path)
            }
            Err(err) => {
                self.notify_error("Failed to export comparables");
                Err(err)
            }
        }
    }

    /// Write `CMA_Report_<date>.json` and `.txt` into `dir`.
    pub fn export_report(&mut self, dir: &Path, now: DateTime<Utc>) -> Result<(PathBuf, PathBuf)> {
        match self.report_bundle(now).write_to_dir(dir) {
            Ok(paths) => {
                self.notify_success("Report exported as JSON and text");
                Ok(paths)
            }
            Err(err) => {
                self.notify_error("Failed to export report");
                Err(err)
            }
        }
    }

    // ========================================================================
    // TABS
    // ========================================================================

    pub fn active_tab(&self) -> Tab {
        self.state.active_tab
    }

    pub fn select_tab(&mut self, tab: Tab) {
        self.state.active_tab = tab;
    }

    pub fn next_tab(&mut self) {
        self.state.active_tab = self.state.active_tab.next();
    }

    pub fn previous_tab(&mut self) {
        self.state.active_tab = self.state.active_tab.previous();
    }

    // ========================================================================
    // NOTIFICATIONS
    // ========================================================================

    pub fn notify_success(&mut self, message: impl Into<String>) {
        self.push_notification(NotificationKind::Success, message.into());
    }

    pub fn notify_warning(&mut self, message: impl Into<String>) {
        self.push_notification(NotificationKind::Warning, message.into());
    }

    pub fn notify_error(&mut self, message: impl Into<String>) {
        self.push_notification(NotificationKind::Error, message.into());
    }

    fn push_notification(&mut self, kind: NotificationKind, message: String) {
        let ttl = match kind {
            NotificationKind::Success => self.toast.success(),
            NotificationKind::Warning | NotificationKind::Error => self.toast.error(),
        };
        let ttl = Duration::from_std(ttl).unwrap_or_else(|_| Duration::seconds(5));
        self.notifications.push(Notification {
            kind,
            message,
            expires_at: Utc::now() + ttl,
        });
    }

    /// Most recent notification still on screen at `now`.
    pub fn latest_notification(&self, now: DateTime<Utc>) -> Option<&Notification> {
        self.notifications.iter().rev().find(|n| n.is_live(now))
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    /// Drop expired notifications.
    pub fn prune_notifications(&mut self, now: DateTime<Utc>) {
        self.notifications.retain(|n| n.is_live(now));
    }

    // ========================================================================
    // PERSISTENCE
    // ========================================================================

    /// Run a store write; failures become an error notification.
    fn persist<F>(&mut self, write: F)
    where
        F: FnOnce(&LocalStore, &DashboardState) -> StorageResult<()>,
    {
        if let Err(err) = write(&self.store, &self.state) {
            warn!(error = %err, "failed to save data locally");
            self.notify_error(err.to_string());
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
