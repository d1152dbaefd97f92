// 🌐 REST API over the dashboard controller (feature "server")
//
// Every response uses the ApiResponse envelope. The dashboard lock is never
// held across an await.

use crate::app::Dashboard;
use crate::calc::{MortgageBreakdown, PropertyMetrics, Recommendation, RepairRoi};
use crate::entities::{
    ClientIntake, ClientRecord, ComparableListing, FeatureConditions, MortgageField,
    MortgageParameters, PhotoGallery, RepairBudgetMap, VersionSnapshot,
};
use crate::error::PhotoError;
use crate::export::{comparables_csv, ReportBundle};
use crate::mls::{MlsClient, MlsUpdate};
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{delete, get, post, put},
    Router,
};
use base64::Engine;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use tower_http::cors::CorsLayer;
use tracing::error;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub dashboard: Arc<Mutex<Dashboard>>,
    pub mls: Arc<MlsClient>,
}

impl AppState {
    pub fn new(dashboard: Dashboard, mls: MlsClient) -> Self {
        AppState {
            dashboard: Arc::new(Mutex::new(dashboard)),
            mls: Arc::new(mls),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Dashboard>, Response> {
        self.dashboard.lock().map_err(|_| {
            error!("dashboard mutex poisoned");
            failure(StatusCode::INTERNAL_SERVER_ERROR, "Dashboard state unavailable")
        })
    }
}

/// API Response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

fn failure(status: StatusCode, message: impl Into<String>) -> Response {
    let body: ApiResponse<()> = ApiResponse {
        success: false,
        data: None,
        error: Some(message.into()),
    };
    (status, Json(body)).into_response()
}

fn ok<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(ApiResponse::ok(data))).into_response()
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StateResponse<'a> {
    authenticated: bool,
    user_email: Option<&'a str>,
    #[serde(flatten)]
    state: &'a crate::app::DashboardState,
}

#[derive(Debug, Deserialize)]
pub struct BudgetUpdate {
    pub amount: f64,
}

#[derive(Serialize)]
struct VersionSaved {
    id: String,
}

#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct FindingsUpdate {
    pub findings: String,
}

/// Partial mortgage form. Present fields are applied in form order.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MortgageUpdate {
    pub purchase_price: Option<f64>,
    pub down_payment: Option<f64>,
    pub interest_rate: Option<f64>,
    pub loan_term: Option<u32>,
    pub property_tax: Option<f64>,
    pub home_insurance: Option<f64>,
    pub hoa: Option<f64>,
    pub pmi: Option<f64>,
}

impl MortgageUpdate {
    fn fields(&self) -> Vec<MortgageField> {
        [
            self.purchase_price.map(MortgageField::PurchasePrice),
            self.down_payment.map(MortgageField::DownPayment),
            self.interest_rate.map(MortgageField::InterestRate),
            self.loan_term.map(MortgageField::LoanTerm),
            self.property_tax.map(MortgageField::PropertyTax),
            self.home_insurance.map(MortgageField::HomeInsurance),
            self.hoa.map(MortgageField::Hoa),
            self.pmi.map(MortgageField::Pmi),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

#[derive(Serialize)]
struct MortgageView<'a> {
    parameters: &'a MortgageParameters,
    breakdown: MortgageBreakdown,
}

#[derive(Serialize)]
struct Created {
    id: String,
}

/// Base64 image upload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoUpload {
    pub name: String,
    pub mime_type: String,
    pub data: String,
}

fn photo_failure(err: PhotoError) -> Response {
    let status = match err {
        PhotoError::NotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::BAD_REQUEST,
    };
    failure(status, err.to_string())
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/state - Full dashboard state
async fn get_state(State(state): State<AppState>) -> Response {
    let dash = match state.lock() {
        Ok(dash) => dash,
        Err(resp) => return resp,
    };
    ok(StateResponse {
        authenticated: dash.is_authenticated(),
        user_email: dash.session().user_email.as_deref(),
        state: dash.state(),
    })
}

/// GET /api/comparables
async fn get_comparables(State(state): State<AppState>) -> Response {
    match state.lock() {
        Ok(dash) => ok::<&[ComparableListing]>(dash.comparables()),
        Err(resp) => resp,
    }
}

/// GET /api/comparables.csv - CSV download
async fn get_comparables_csv(State(state): State<AppState>) -> Response {
    let csv = match state.lock() {
        Ok(dash) => comparables_csv(dash.comparables()),
        Err(resp) => return resp,
    };

    match csv {
        Ok(body) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/csv"),
                (header::CONTENT_DISPOSITION, "attachment; filename=\"comparables_export.csv\""),
            ],
            body,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "CSV export failed");
            failure(StatusCode::INTERNAL_SERVER_ERROR, "Failed to export comparables")
        }
    }
}

/// GET /api/metrics
async fn get_metrics(State(state): State<AppState>) -> Response {
    match state.lock() {
        Ok(dash) => ok::<PropertyMetrics>(dash.metrics()),
        Err(resp) => resp,
    }
}

/// GET /api/mortgage
async fn get_mortgage(State(state): State<AppState>) -> Response {
    match state.lock() {
        Ok(dash) => ok::<MortgageBreakdown>(dash.mortgage_breakdown()),
        Err(resp) => resp,
    }
}

/// GET /api/roi
async fn get_roi(State(state): State<AppState>) -> Response {
    match state.lock() {
        Ok(dash) => ok::<RepairRoi>(dash.repair_roi()),
        Err(resp) => resp,
    }
}

/// POST /api/recommendations - Apply condition rules and regenerate the summary
async fn run_recommendations(State(state): State<AppState>) -> Response {
    match state.lock() {
        Ok(mut dash) => ok::<&Recommendation>(dash.run_recommendations(Utc::now())),
        Err(resp) => resp,
    }
}

/// PUT /api/budgets/:category
async fn update_budget(
    State(state): State<AppState>,
    Path(category): Path<String>,
    Json(update): Json<BudgetUpdate>,
) -> Response {
    let mut dash = match state.lock() {
        Ok(dash) => dash,
        Err(resp) => return resp,
    };
    match dash.update_repair_budget(&category, update.amount) {
        Ok(()) => ok::<&RepairBudgetMap>(dash.budgets()),
        Err(e) => failure(StatusCode::BAD_REQUEST, e.to_string()),
    }
}

/// POST /api/versions - Snapshot property and budgets
async fn save_version(State(state): State<AppState>) -> Response {
    match state.lock() {
        Ok(mut dash) => ok(VersionSaved { id: dash.save_version() }),
        Err(resp) => resp,
    }
}

/// GET /api/versions - Most recent versions, newest first
async fn list_versions(State(state): State<AppState>) -> Response {
    match state.lock() {
        Ok(dash) => ok::<Vec<&VersionSnapshot>>(dash.recent_versions()),
        Err(resp) => resp,
    }
}

/// GET /api/report - JSON report bundle
async fn get_report(State(state): State<AppState>) -> Response {
    match state.lock() {
        Ok(dash) => ok::<ReportBundle>(dash.report_bundle(Utc::now())),
        Err(resp) => resp,
    }
}

/// POST /api/login
async fn login(State(state): State<AppState>, Json(creds): Json<Credentials>) -> Response {
    let mut dash = match state.lock() {
        Ok(dash) => dash,
        Err(resp) => return resp,
    };
    match dash.login(&creds.email, &creds.password) {
        Ok(()) => ok(dash.session().user_email.clone()),
        Err(e) => failure(StatusCode::UNAUTHORIZED, e.to_string()),
    }
}

/// POST /api/logout
async fn logout(State(state): State<AppState>) -> Response {
    match state.lock() {
        Ok(mut dash) => {
            dash.logout();
            ok(())
        }
        Err(resp) => resp,
    }
}

/// PUT /api/conditions - Feature conditions feeding the recommendation rules
async fn update_conditions(
    State(state): State<AppState>,
    Json(conditions): Json<FeatureConditions>,
) -> Response {
    match state.lock() {
        Ok(mut dash) => {
            dash.set_conditions(conditions);
            ok::<&FeatureConditions>(&dash.property().conditions)
        }
        Err(resp) => resp,
    }
}

/// PUT /api/findings
async fn update_findings(
    State(state): State<AppState>,
    Json(update): Json<FindingsUpdate>,
) -> Response {
    match state.lock() {
        Ok(mut dash) => {
            dash.set_findings(update.findings);
            ok::<&str>(&dash.state().findings)
        }
        Err(resp) => resp,
    }
}

/// POST /api/budget-presets/:name - reset | recommended | high-roi
async fn apply_budget_preset(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    let mut dash = match state.lock() {
        Ok(dash) => dash,
        Err(resp) => return resp,
    };
    match name.as_str() {
        "reset" => dash.reset_budgets(),
        "recommended" => dash.apply_recommended_budgets(),
        "high-roi" => dash.apply_high_roi_budgets(),
        other => return failure(StatusCode::NOT_FOUND, format!("Unknown budget preset: {}", other)),
    }
    ok::<&RepairBudgetMap>(dash.budgets())
}

/// PUT /api/mortgage - All fields are validated before any is applied
async fn update_mortgage(
    State(state): State<AppState>,
    Json(update): Json<MortgageUpdate>,
) -> Response {
    let mut dash = match state.lock() {
        Ok(dash) => dash,
        Err(resp) => return resp,
    };

    let fields = update.fields();
    let mut candidate = dash.mortgage().clone();
    for field in &fields {
        if let Err(e) = candidate.apply(*field) {
            dash.notify_error(e.to_string());
            return failure(StatusCode::BAD_REQUEST, e.to_string());
        }
    }
    for field in fields {
        if let Err(e) = dash.update_mortgage(field) {
            return failure(StatusCode::BAD_REQUEST, e.to_string());
        }
    }

    ok(MortgageView {
        parameters: dash.mortgage(),
        breakdown: dash.mortgage_breakdown(),
    })
}

/// GET /api/clients - Most recent clients, newest first
async fn list_clients(State(state): State<AppState>) -> Response {
    match state.lock() {
        Ok(dash) => ok::<Vec<&ClientRecord>>(dash.recent_clients()),
        Err(resp) => resp,
    }
}

/// POST /api/clients - Client intake form
async fn add_client(State(state): State<AppState>, Json(intake): Json<ClientIntake>) -> Response {
    let mut dash = match state.lock() {
        Ok(dash) => dash,
        Err(resp) => return resp,
    };
    match dash.add_client(intake) {
        Ok(id) => ok(Created { id }),
        Err(errors) => {
            let body = ApiResponse {
                success: false,
                data: Some(&errors.0),
                error: Some(errors.to_string()),
            };
            (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response()
        }
    }
}

/// POST /api/clients/:id/load - Copy the client's property onto the subject
async fn load_client(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let mut dash = match state.lock() {
        Ok(dash) => dash,
        Err(resp) => return resp,
    };
    match dash.load_client(&id) {
        Ok(()) => ok(dash.property()),
        Err(e) => failure(StatusCode::NOT_FOUND, e.to_string()),
    }
}

/// POST /api/versions/:id/restore
async fn restore_version(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let mut dash = match state.lock() {
        Ok(dash) => dash,
        Err(resp) => return resp,
    };
    match dash.restore_version(&id) {
        Ok(()) => ok(dash.property()),
        Err(e) => failure(StatusCode::NOT_FOUND, e.to_string()),
    }
}

/// DELETE /api/versions/:id
async fn delete_version(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let mut dash = match state.lock() {
        Ok(dash) => dash,
        Err(resp) => return resp,
    };
    match dash.delete_version(&id) {
        Ok(()) => ok(()),
        Err(e) => failure(StatusCode::NOT_FOUND, e.to_string()),
    }
}

/// GET /api/photos
async fn list_photos(State(state): State<AppState>) -> Response {
    match state.lock() {
        Ok(dash) => ok::<&PhotoGallery>(dash.photos()),
        Err(resp) => resp,
    }
}

/// POST /api/photos - Base64 upload
async fn upload_photo(State(state): State<AppState>, Json(upload): Json<PhotoUpload>) -> Response {
    let bytes = match base64::engine::general_purpose::STANDARD.decode(upload.data.trim()) {
        Ok(bytes) => bytes,
        Err(_) => return failure(StatusCode::BAD_REQUEST, "Photo data is not valid base64"),
    };

    let mut dash = match state.lock() {
        Ok(dash) => dash,
        Err(resp) => return resp,
    };
    match dash.add_photo(&upload.name, &upload.mime_type, &bytes) {
        Ok(id) => ok(Created { id }),
        Err(e) => photo_failure(e),
    }
}

/// DELETE /api/photos/:id
async fn delete_photo(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let mut dash = match state.lock() {
        Ok(dash) => dash,
        Err(resp) => return resp,
    };
    match dash.remove_photo(&id) {
        Ok(()) => ok(()),
        Err(e) => photo_failure(e),
    }
}

/// DELETE /api/photos
async fn clear_photos(State(state): State<AppState>) -> Response {
    match state.lock() {
        Ok(mut dash) => {
            dash.clear_photos();
            ok(())
        }
        Err(resp) => resp,
    }
}

/// POST /api/mls/:address - Point the subject at `address` and refresh comparables
async fn refresh_mls(State(state): State<AppState>, Path(address): Path<String>) -> Response {
    // Decode URL-encoded address
    let decoded = urlencoding::decode(&address)
        .unwrap_or_else(|_| address.clone().into())
        .into_owned();
    let requested = decoded.trim().to_string();

    {
        let mut dash = match state.lock() {
            Ok(dash) => dash,
            Err(resp) => return resp,
        };
        if !dash.is_authenticated() {
            return failure(StatusCode::UNAUTHORIZED, "Log in to refresh MLS data");
        }
        dash.set_address(&requested);
    }

    let result = state.mls.fetch_comparables(&requested).await;
    if let Err(e) = &result {
        return failure(StatusCode::BAD_REQUEST, e.to_string());
    }

    let mut dash = match state.lock() {
        Ok(dash) => dash,
        Err(resp) => return resp,
    };
    // Tagged with the fetched address so a superseded request is dropped.
    if dash.apply_mls_update(MlsUpdate { address: requested, result }) {
        ok::<&[ComparableListing]>(dash.comparables())
    } else {
        failure(StatusCode::CONFLICT, "Address changed while fetching")
    }
}

// ============================================================================
// Router
// ============================================================================

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/state", get(get_state))
        .route("/comparables", get(get_comparables))
        .route("/comparables.csv", get(get_comparables_csv))
        .route("/metrics", get(get_metrics))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/conditions", put(update_conditions))
        .route("/findings", put(update_findings))
        .route("/mortgage", get(get_mortgage).put(update_mortgage))
        .route("/roi", get(get_roi))
        .route("/recommendations", post(run_recommendations))
        .route("/budgets/:category", put(update_budget))
        .route("/budget-presets/:name", post(apply_budget_preset))
        .route("/clients", get(list_clients).post(add_client))
        .route("/clients/:id/load", post(load_client))
        .route("/versions", post(save_version).get(list_versions))
        .route("/versions/:id", delete(delete_version))
        .route("/versions/:id/restore", post(restore_version))
        .route("/photos", get(list_photos).post(upload_photo).delete(clear_photos))
        .route("/photos/:id", delete(delete_photo))
        .route("/report", get(get_report))
        .route("/mls/:address", post(refresh_mls))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
}
