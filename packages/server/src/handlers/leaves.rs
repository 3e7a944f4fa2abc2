use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::{Capability, LeaveStatus, Role};
use sea_orm::*;
use tracing::instrument;

use crate::entity::{leave_application, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::leave::*;
use crate::models::shared::{Page, PageQuery};
use crate::state::AppState;
use crate::utils::clock;
use crate::utils::lookup::{find, find_visible};
use crate::utils::page::fetch_page;
use crate::utils::scope::visible;

#[utoipa::path(
    get,
    path = "/",
    tag = "Leaves",
    operation_id = "listLeaves",
    summary = "List leave applications",
    description = "Students see only their own applications; staff see all.",
    params(LeaveListQuery),
    responses(
        (status = 200, description = "Applications, newest first", body = Page<LeaveResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query))]
pub async fn list_leaves(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<LeaveListQuery>,
) -> Result<Json<Page<LeaveResponse>>, AppError> {
    let page_query = PageQuery {
        page: query.page,
        per_page: query.per_page,
    };
    let (_, mut select) =
        visible::<leave_application::Entity>(&auth_user.actor, clock::today());

    if let Some(status) = query.status {
        select = select.filter(leave_application::Column::Status.eq(status));
    }
    if let Some(applicant_id) = query.applicant_id {
        select = select.filter(leave_application::Column::ApplicantId.eq(applicant_id));
    }

    let select = select.order_by_desc(leave_application::Column::AppliedOn);
    let (rows, pagination) = fetch_page(&state.db, select, &page_query).await?;

    Ok(Json(Page::new(
        rows.into_iter().map(LeaveResponse::from).collect(),
        pagination,
    )))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Leaves",
    operation_id = "applyLeave",
    summary = "Apply for leave",
    request_body = ApplyLeaveRequest,
    responses(
        (status = 201, description = "Application submitted", body = LeaveResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id()))]
pub async fn apply_leave(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<ApplyLeaveRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require(Capability::ApplyLeave)?;
    validate_apply_leave(&payload)?;

    let model = leave_application::ActiveModel {
        applicant_id: Set(auth_user.user_id()),
        start_date: Set(payload.start_date),
        end_date: Set(payload.end_date),
        reason: Set(payload.reason.trim().to_string()),
        status: Set(LeaveStatus::Pending),
        applied_on: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(LeaveResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Leaves",
    operation_id = "getLeave",
    summary = "Get a leave application",
    params(("id" = i32, Path, description = "Leave application ID")),
    responses(
        (status = 200, description = "Application", body = LeaveResponse),
        (status = 404, description = "Not found or not visible (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn get_leave(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<LeaveResponse>, AppError> {
    let model = find_visible::<leave_application::Entity, _>(
        &state.db,
        &auth_user.actor,
        id,
        "Leave application",
    )
    .await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    post,
    path = "/{id}/review",
    tag = "Leaves",
    operation_id = "reviewLeave",
    summary = "Approve or reject a pending application",
    description = "Teachers review student applications; admins review any. Nobody reviews their own. Reviewed applications cannot be reviewed again.",
    params(("id" = i32, Path, description = "Leave application ID")),
    request_body = ReviewLeaveRequest,
    responses(
        (status = 200, description = "Application reviewed", body = LeaveResponse),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Application not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Already reviewed (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id, decision = ?payload.decision))]
pub async fn review_leave(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<ReviewLeaveRequest>,
) -> Result<Json<LeaveResponse>, AppError> {
    auth_user.require(Capability::ReviewLeave)?;

    let txn = state.db.begin().await?;
    let existing = leave_application::Entity::find_by_id(id)
        .lock_exclusive()
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Leave application not found".into()))?;

    if existing.applicant_id == auth_user.user_id() {
        return Err(AppError::PermissionDenied);
    }
    if !auth_user.actor.is_admin() {
        let applicant = find::<user::Entity, _>(&txn, existing.applicant_id, "Applicant").await?;
        if applicant.role != Role::Student {
            return Err(AppError::PermissionDenied);
        }
    }

    let status = existing.status.review(payload.decision)?;

    let mut active: leave_application::ActiveModel = existing.into();
    active.status = Set(status);
    active.reviewed_by = Set(Some(auth_user.user_id()));
    active.reviewed_on = Set(Some(chrono::Utc::now()));
    if payload.remarks.is_some() {
        active.remarks = Set(payload.remarks);
    }

    let model = active.update(&txn).await?;
    txn.commit().await?;

    tracing::info!(leave_id = model.id, status = %model.status, "Leave reviewed");
    Ok(Json(model.into()))
}
