// Entity Models
//
// Plain records owned by the dashboard controller:
// - property / comparables: the subject and its market references
// - repair: static category table + editable budget map
// - mortgage, client, version, photo: form-backed records

pub mod property;
pub mod comparable;
pub mod repair;
pub mod mortgage;
pub mod client;
pub mod version;
pub mod photo;
pub mod market;

pub use property::{Condition, FeatureConditions, PropertyRecord, StagingNeed};
pub use comparable::{sample_comparables, ComparableListing, ListingStatus};
pub use repair::{RepairBudgetMap, RepairCategory, RepairCategoryTable, RepairKind};
pub use mortgage::{MortgageField, MortgageParameters, ALLOWED_LOAN_TERMS};
pub use client::{recent_clients, ClientIntake, ClientRecord, ComponentCondition};
pub use version::{VersionHistory, VersionSnapshot, MAX_VERSIONS};
pub use photo::{PhotoGallery, PropertyPhoto};
pub use market::{market_trends, MarketTrendPoint};
