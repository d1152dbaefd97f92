// CMA Dashboard - Core Library
// Exposes all modules for use in the TUI, CLI, API server, and tests

pub mod error;
pub mod validation;
pub mod entities;
pub mod calc;
pub mod db;
pub mod config;
pub mod logging;
pub mod auth;
pub mod mls;
pub mod export;
pub mod app;

#[cfg(feature = "server")]
pub mod api;

#[cfg(feature = "tui")]
pub mod ui;

// Re-export commonly used types
pub use app::{Dashboard, DashboardState, Notification, NotificationKind, Tab};
pub use calc::{
    calculate_mortgage, calculate_property_metrics, calculate_repair_roi,
    CompetitiveAdvantage, MortgageBreakdown, PropertyMetrics, Recommendation,
    RecommendationEngine, RepairRoi,
};
pub use config::Config;
pub use db::{setup_database, LocalStore};
pub use entities::{
    ComparableListing, FeatureConditions, MortgageParameters, PropertyRecord,
    RepairBudgetMap, RepairCategoryTable, RepairKind,
};
pub use error::{AuthError, CalcError, InputError, MlsError, PhotoError, StorageError};
pub use export::ReportBundle;
pub use mls::{ComparableRefresher, MlsClient, MlsUpdate};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
