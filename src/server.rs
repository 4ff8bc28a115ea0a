//! StockGuard HTTP API
//!
//! The acting identity is supplied by a trusted upstream in the `x-user-id`
//! header; this layer never authenticates. Every route consults the engine
//! before reading or mutating the store.
//!
//! Run with: cargo run --features server --bin stockguard-server

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::authz::Authorizer;
use crate::catalog::{Permission, PermissionCatalog, PermissionCode};
use crate::db::Store;
use crate::entity::{NewUser, User, UserGroup};
use crate::error::StockguardError;
use crate::read::{GroupStore, UserStore};
use crate::surface::{Entry, NavEntry, Screen};
use crate::write;

pub const USER_HEADER: &str = "x-user-id";

// ============================================================================
// State
// ============================================================================

#[derive(Clone)]
pub struct AppState {
    store: Store,
}

impl AppState {
    pub fn new(store: Store) -> Self {
        AppState { store }
    }
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Serialize)]
pub struct ApiResponse<T> {
    success: bool,
    data: Option<T>,
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self { success: true, data: Some(data), error: None }
    }

    fn err(msg: impl Into<String>) -> Self {
        Self { success: false, data: None, error: Some(msg.into()) }
    }
}

#[derive(Serialize)]
struct HealthRes {
    status: &'static str,
    version: &'static str,
}

#[derive(Serialize)]
struct MeRes {
    user: User,
    role: &'static str,
    permissions: Vec<PermissionCode>,
    navigation: Vec<NavEntry>,
}

#[derive(Serialize)]
struct CheckRes {
    capability: String,
    allowed: bool,
}

#[derive(Deserialize)]
struct CreateGroupReq {
    name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateGroupReq {
    name: Option<String>,
    permission_ids: Option<Vec<String>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssignGroupReq {
    group_id: Option<String>,
}

#[derive(Serialize)]
struct DeletedRes {
    deleted: bool,
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        ApiError { status, message: message.into() }
    }
}

impl From<StockguardError> for ApiError {
    fn from(e: StockguardError) -> Self {
        let status = match &e {
            StockguardError::AccessDenied { .. } | StockguardError::ProtectedUser(_) => StatusCode::FORBIDDEN,
            StockguardError::NotFound { .. } => StatusCode::NOT_FOUND,
            StockguardError::DuplicateUsername(_)
            | StockguardError::DuplicateGroupName(_)
            | StockguardError::GroupInUse { .. }
            | StockguardError::AlreadyBootstrapped => StatusCode::CONFLICT,
            StockguardError::InvalidName(_) | StockguardError::UnknownPermission(_) => StatusCode::BAD_REQUEST,
            StockguardError::Storage(_)
            | StockguardError::Io(_)
            | StockguardError::Encoding(_)
            | StockguardError::InvalidCatalog(_)
            | StockguardError::Config(_) => {
                tracing::error!(error = %e, "request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        ApiError::new(status, e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ApiResponse::<()>::err(self.message))).into_response()
    }
}

type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

fn ok<T>(data: T) -> ApiResult<T> {
    Ok(Json(ApiResponse::ok(data)))
}

// ============================================================================
// Helpers
// ============================================================================

/// Resolve the acting user from the identity header
fn actor(state: &AppState, headers: &HeaderMap) -> Result<User, ApiError> {
    let id = headers
        .get(USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::new(StatusCode::UNAUTHORIZED, "missing identity"))?;
    state
        .store
        .user_by_id(id)?
        .ok_or_else(|| ApiError::new(StatusCode::UNAUTHORIZED, format!("unknown user '{}'", id)))
}

fn require(state: &AppState, user: &User, code: PermissionCode) -> Result<(), ApiError> {
    Ok(Authorizer::new(&state.store).require(user, code)?)
}

// ============================================================================
// Handlers
// ============================================================================

async fn health() -> Json<HealthRes> {
    Json(HealthRes { status: "ok", version: env!("CARGO_PKG_VERSION") })
}

async fn me(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<MeRes> {
    let user = actor(&state, &headers)?;
    let authz = Authorizer::new(&state.store);
    let permissions = authz.granted(&user);
    let navigation = authz.navigation(&user);
    ok(MeRes { role: user.role_label(), user, permissions, navigation })
}

async fn check(State(state): State<AppState>, headers: HeaderMap, Path(capability): Path<String>) -> ApiResult<CheckRes> {
    let user = actor(&state, &headers)?;
    let allowed = Authorizer::new(&state.store).can_perform(&user, &capability);
    ok(CheckRes { capability, allowed })
}

async fn screen(State(state): State<AppState>, headers: HeaderMap, Path(key): Path<String>) -> ApiResult<Entry> {
    let user = actor(&state, &headers)?;
    let screen = Screen::from_key(&key).ok_or_else(|| ApiError::new(StatusCode::NOT_FOUND, format!("unknown screen '{}'", key)))?;
    match Authorizer::new(&state.store).enter(&user, screen) {
        Entry::Denied { message, .. } => Err(ApiError::new(StatusCode::FORBIDDEN, message)),
        granted => ok(granted),
    }
}

async fn permissions(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Vec<Permission>> {
    let user = actor(&state, &headers)?;
    require(&state, &user, PermissionCode::ViewGroups)?;
    ok(PermissionCatalog::standard().list().to_vec())
}

// Users

async fn list_users(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Vec<User>> {
    let user = actor(&state, &headers)?;
    require(&state, &user, PermissionCode::ViewUsers)?;
    ok(state.store.all_users()?)
}

async fn create_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<NewUser>,
) -> Result<(StatusCode, Json<ApiResponse<User>>), ApiError> {
    let user = actor(&state, &headers)?;
    let created = write::create_user(&state.store, &user, req)?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(created))))
}

async fn delete_user(State(state): State<AppState>, headers: HeaderMap, Path(id): Path<String>) -> ApiResult<DeletedRes> {
    let user = actor(&state, &headers)?;
    ok(DeletedRes { deleted: write::delete_user(&state.store, &user, &id)? })
}

async fn assign_group(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(req): Json<AssignGroupReq>,
) -> ApiResult<User> {
    let user = actor(&state, &headers)?;
    ok(write::assign_group(&state.store, &user, &id, req.group_id.as_deref())?)
}

// Groups

async fn list_groups(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Vec<UserGroup>> {
    let user = actor(&state, &headers)?;
    require(&state, &user, PermissionCode::ViewGroups)?;
    ok(state.store.all_groups()?)
}

async fn create_group(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateGroupReq>,
) -> Result<(StatusCode, Json<ApiResponse<UserGroup>>), ApiError> {
    let user = actor(&state, &headers)?;
    let group = write::create_group(&state.store, &user, &req.name)?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(group))))
}

async fn update_group(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(req): Json<UpdateGroupReq>,
) -> ApiResult<UserGroup> {
    let user = actor(&state, &headers)?;
    ok(write::update_group(&state.store, &user, &id, req.name.as_deref(), req.permission_ids)?)
}

async fn delete_group(State(state): State<AppState>, headers: HeaderMap, Path(id): Path<String>) -> ApiResult<DeletedRes> {
    let user = actor(&state, &headers)?;
    ok(DeletedRes { deleted: write::delete_group(&state.store, &user, &id)? })
}

async fn toggle_permission(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((id, permission_id)): Path<(String, String)>,
) -> ApiResult<UserGroup> {
    let user = actor(&state, &headers)?;
    ok(write::toggle_permission(&state.store, &user, &id, &permission_id)?)
}

// ============================================================================
// Router
// ============================================================================

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/me", get(me))
        .route("/api/check/:capability", get(check))
        .route("/api/screens/:screen", get(screen))
        .route("/api/permissions", get(permissions))
        .route("/api/users", get(list_users).post(create_user))
        .route("/api/users/:id", delete(delete_user))
        .route("/api/users/:id/group", put(assign_group))
        .route("/api/groups", get(list_groups).post(create_group))
        .route("/api/groups/:id", put(update_group).delete(delete_group))
        .route("/api/groups/:id/permissions/:permission_id", post(toggle_permission))
        .with_state(state)
}
