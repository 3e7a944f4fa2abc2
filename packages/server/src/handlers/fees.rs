use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::{PaymentStatus, fee::payment_status};
use sea_orm::*;
use tracing::instrument;

use crate::entity::{fee, student};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::fee::*;
use crate::models::shared::{Page, PageQuery};
use crate::state::AppState;
use crate::utils::clock;
use crate::utils::lookup::{find, find_visible};
use crate::utils::page::fetch_page;
use crate::utils::scope::visible;

#[utoipa::path(
    get,
    path = "/",
    tag = "Fees",
    operation_id = "listFees",
    summary = "List fees",
    description = "Students see only their own fees.",
    params(FeeListQuery),
    responses(
        (status = 200, description = "Fees by due date", body = Page<FeeResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query))]
pub async fn list_fees(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<FeeListQuery>,
) -> Result<Json<Page<FeeResponse>>, AppError> {
    let page_query = PageQuery {
        page: query.page,
        per_page: query.per_page,
    };
    let (scope, mut select) = visible::<fee::Entity>(&auth_user.actor, clock::today());
    if scope.is_nothing() {
        return Ok(Json(Page::degraded(
            &page_query,
            auth_user.actor.profile_warning(),
        )));
    }

    if let Some(student_id) = query.student_id {
        select = select.filter(fee::Column::StudentId.eq(student_id));
    }
    if let Some(status) = query.payment_status {
        select = select.filter(fee::Column::PaymentStatus.eq(status));
    }
    if let Some(fee_type) = query.fee_type {
        select = select.filter(fee::Column::FeeType.eq(fee_type));
    }
    if let Some(ref year) = query.academic_year {
        select = select.filter(fee::Column::AcademicYear.eq(year.trim()));
    }

    let select = select
        .order_by_asc(fee::Column::DueDate)
        .order_by_asc(fee::Column::Id);
    let (rows, pagination) = fetch_page(&state.db, select, &page_query).await?;

    Ok(Json(Page::new(
        rows.into_iter().map(FeeResponse::from).collect(),
        pagination,
    )))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Fees",
    operation_id = "createFee",
    summary = "Charge a fee to a student",
    description = "Admin only. The payment status is derived from the amounts and the due date.",
    request_body = CreateFeeRequest,
    responses(
        (status = 201, description = "Fee created", body = FeeResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Student not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(student_id = payload.student_id))]
pub async fn create_fee(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateFeeRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_admin()?;
    validate_create_fee(&payload)?;

    let student = find::<student::Entity, _>(&state.db, payload.student_id, "Student").await?;
    let status = payment_status(
        payload.amount,
        payload.paid_amount,
        payload.due_date,
        PaymentStatus::Pending,
        clock::today(),
    );

    let model = fee::ActiveModel {
        student_id: Set(student.id),
        fee_type: Set(payload.fee_type),
        amount: Set(payload.amount),
        due_date: Set(payload.due_date),
        paid_amount: Set(payload.paid_amount),
        payment_status: Set(status),
        payment_date: Set(payload.payment_date),
        transaction_id: Set(payload.transaction_id),
        academic_year: Set(payload.academic_year.trim().to_string()),
        semester: Set(payload.semester),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(FeeResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Fees",
    operation_id = "getFee",
    summary = "Get a fee",
    params(("id" = i32, Path, description = "Fee ID")),
    responses(
        (status = 200, description = "Fee", body = FeeResponse),
        (status = 404, description = "Not found or not visible (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn get_fee(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<FeeResponse>, AppError> {
    let model = find_visible::<fee::Entity, _>(&state.db, &auth_user.actor, id, "Fee").await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Fees",
    operation_id = "updateFee",
    summary = "Update a fee",
    description = "Admin only. The payment status is recomputed on every update.",
    params(("id" = i32, Path, description = "Fee ID")),
    request_body = UpdateFeeRequest,
    responses(
        (status = 200, description = "Fee updated", body = FeeResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Fee not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn update_fee(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateFeeRequest>,
) -> Result<Json<FeeResponse>, AppError> {
    auth_user.require_admin()?;
    validate_update_fee(&payload)?;

    let existing = find::<fee::Entity, _>(&state.db, id, "Fee").await?;

    let amount = payload.amount.unwrap_or(existing.amount);
    let paid = payload.paid_amount.unwrap_or(existing.paid_amount);
    let due_date = payload.due_date.unwrap_or(existing.due_date);
    let status = payment_status(
        amount,
        paid,
        due_date,
        existing.payment_status,
        clock::today(),
    );

    let mut active: fee::ActiveModel = existing.into();
    if let Some(fee_type) = payload.fee_type {
        active.fee_type = Set(fee_type);
    }
    active.amount = Set(amount);
    active.paid_amount = Set(paid);
    active.due_date = Set(due_date);
    active.payment_status = Set(status);
    if let Some(date) = payload.payment_date {
        active.payment_date = Set(date);
    }
    if let Some(txn_id) = payload.transaction_id {
        active.transaction_id = Set(txn_id);
    }
    if let Some(year) = payload.academic_year {
        active.academic_year = Set(year.trim().to_string());
    }
    if let Some(semester) = payload.semester {
        active.semester = Set(semester);
    }

    let model = active.update(&state.db).await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    post,
    path = "/{id}/payments",
    tag = "Fees",
    operation_id = "recordFeePayment",
    summary = "Record a payment against a fee",
    description = "Admin only. Adds to the paid amount and recomputes the status.",
    params(("id" = i32, Path, description = "Fee ID")),
    request_body = RecordPaymentRequest,
    responses(
        (status = 200, description = "Payment recorded", body = FeeResponse),
        (status = 400, description = "Non-positive or excessive payment (VALIDATION_ERROR)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Fee not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn record_payment(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<RecordPaymentRequest>,
) -> Result<Json<FeeResponse>, AppError> {
    auth_user.require_admin()?;

    let txn = state.db.begin().await?;
    let existing = fee::Entity::find_by_id(id)
        .lock_exclusive()
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Fee not found".into()))?;

    let outstanding = common::fee::balance(existing.amount, existing.paid_amount);
    validate_payment(payload.amount, outstanding)?;

    let paid = existing.paid_amount + payload.amount;
    let status = payment_status(
        existing.amount,
        paid,
        existing.due_date,
        existing.payment_status,
        clock::today(),
    );

    let mut active: fee::ActiveModel = existing.into();
    active.paid_amount = Set(paid);
    active.payment_status = Set(status);
    active.payment_date = Set(Some(payload.payment_date.unwrap_or_else(clock::today)));
    if payload.transaction_id.is_some() {
        active.transaction_id = Set(payload.transaction_id);
    }

    let model = active.update(&txn).await?;
    txn.commit().await?;

    tracing::info!(fee_id = model.id, status = %model.payment_status, "Fee payment recorded");
    Ok(Json(model.into()))
}
