use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::{AttendanceStatus, Role};
use sea_orm::*;
use tracing::instrument;

use super::users::search_condition;
use crate::entity::{attendance, result, student, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::attendance::AttendanceResponse;
use crate::models::people::*;
use crate::models::result::ResultResponse;
use crate::models::shared::{Page, PageQuery};
use crate::state::AppState;
use crate::utils::clock;
use crate::utils::lookup::{accounts, find};
use crate::utils::page::fetch_page;

/// Load a student the actor may look at.
///
/// Admins and teachers see every student; a student sees only their own
/// profile. Anything else is reported as missing.
async fn find_student<C: ConnectionTrait>(
    db: &C,
    auth_user: &AuthUser,
    id: i32,
) -> Result<student::Model, AppError> {
    let actor = &auth_user.actor;
    if actor.is_student() && actor.student_id() != Some(id) {
        return Err(AppError::NotFound("Student not found".into()));
    }
    find::<student::Entity, _>(db, id, "Student").await
}

async fn student_response<C: ConnectionTrait>(
    db: &C,
    model: student::Model,
) -> Result<StudentResponse, AppError> {
    let account = user::Entity::find_by_id(model.user_id).one(db).await?;
    Ok(StudentResponse::new(model, account.as_ref()))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Students",
    operation_id = "listStudents",
    summary = "List student profiles",
    description = "Admins and teachers only.",
    params(StudentListQuery),
    responses(
        (status = 200, description = "Students", body = Page<StudentResponse>),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query))]
pub async fn list_students(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<StudentListQuery>,
) -> Result<Json<Page<StudentResponse>>, AppError> {
    if auth_user.actor.is_student() {
        return Err(AppError::PermissionDenied);
    }

    let mut select = student::Entity::find();
    if let Some(classroom_id) = query.classroom_id {
        select = select.filter(student::Column::ClassroomId.eq(classroom_id));
    }
    if let Some(active) = query.is_active {
        select = select.filter(student::Column::IsActive.eq(active));
    }
    if let Some(cond) = query
        .search
        .as_deref()
        .and_then(|s| search_condition(s, &[student::Column::RollNo]))
    {
        select = select.filter(cond);
    }

    let page_query = PageQuery {
        page: query.page,
        per_page: query.per_page,
    };
    let (rows, pagination) =
        fetch_page(&state.db, select.order_by_asc(student::Column::RollNo), &page_query).await?;

    let users = accounts(&state.db, rows.iter().map(|s| s.user_id)).await?;
    let data = rows
        .into_iter()
        .map(|s| {
            let account = users.get(&s.user_id);
            StudentResponse::new(s, account)
        })
        .collect();

    Ok(Json(Page::new(data, pagination)))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Students",
    operation_id = "createStudent",
    summary = "Create a student profile for a student account",
    request_body = CreateStudentRequest,
    responses(
        (status = 201, description = "Student created", body = StudentResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Profile or roll number exists (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = payload.user_id))]
pub async fn create_student(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateStudentRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_admin()?;
    validate_create_student(&payload)?;

    let account = find::<user::Entity, _>(&state.db, payload.user_id, "User").await?;
    if account.role != Role::Student {
        return Err(AppError::Validation(
            "Student profiles can only extend student accounts".into(),
        ));
    }

    let model = student::ActiveModel {
        user_id: Set(account.id),
        roll_no: Set(payload.roll_no.trim().to_string()),
        classroom_id: Set(payload.classroom_id),
        parent_name: Set(payload.parent_name),
        parent_phone: Set(payload.parent_phone),
        admission_date: Set(payload.admission_date.unwrap_or_else(clock::today)),
        is_active: Set(true),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(AppError::on_conflict(
        "Student profile or roll number already exists",
    ))?;

    Ok((
        StatusCode::CREATED,
        Json(StudentResponse::new(model, Some(&account))),
    ))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Students",
    operation_id = "getStudent",
    summary = "Get a student profile",
    description = "Students may only read their own profile.",
    params(("id" = i32, Path, description = "Student ID")),
    responses(
        (status = 200, description = "Student", body = StudentResponse),
        (status = 404, description = "Student not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn get_student(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<StudentResponse>, AppError> {
    let model = find_student(&state.db, &auth_user, id).await?;
    Ok(Json(student_response(&state.db, model).await?))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Students",
    operation_id = "updateStudent",
    summary = "Update a student profile",
    description = "Admin only. `is_active=false` soft-deactivates the profile.",
    params(("id" = i32, Path, description = "Student ID")),
    request_body = UpdateStudentRequest,
    responses(
        (status = 200, description = "Student updated", body = StudentResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Student not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Roll number taken (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn update_student(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateStudentRequest>,
) -> Result<Json<StudentResponse>, AppError> {
    auth_user.require_admin()?;
    validate_update_student(&payload)?;

    let existing = find::<student::Entity, _>(&state.db, id, "Student").await?;
    if payload == UpdateStudentRequest::default() {
        return Ok(Json(student_response(&state.db, existing).await?));
    }

    let mut active: student::ActiveModel = existing.into();
    if let Some(roll_no) = payload.roll_no {
        active.roll_no = Set(roll_no.trim().to_string());
    }
    if let Some(classroom_id) = payload.classroom_id {
        active.classroom_id = Set(classroom_id);
    }
    if let Some(parent_name) = payload.parent_name {
        active.parent_name = Set(parent_name);
    }
    if let Some(parent_phone) = payload.parent_phone {
        active.parent_phone = Set(parent_phone);
    }
    if let Some(is_active) = payload.is_active {
        active.is_active = Set(is_active);
    }

    let model = active
        .update(&state.db)
        .await
        .map_err(AppError::on_conflict("Roll number already exists"))?;
    Ok(Json(student_response(&state.db, model).await?))
}

#[utoipa::path(
    get,
    path = "/{id}/results",
    tag = "Students",
    operation_id = "listStudentResults",
    summary = "Results of one student",
    params(("id" = i32, Path, description = "Student ID"), PageQuery),
    responses(
        (status = 200, description = "Results, newest exam first", body = Page<ResultResponse>),
        (status = 404, description = "Student not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query), fields(id))]
pub async fn list_student_results(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<ResultResponse>>, AppError> {
    let student = find_student(&state.db, &auth_user, id).await?;

    let select = result::Entity::find()
        .filter(result::Column::StudentId.eq(student.id))
        .order_by_desc(result::Column::ExamDate);
    let (rows, pagination) = fetch_page(&state.db, select, &query).await?;

    Ok(Json(Page::new(
        rows.into_iter().map(ResultResponse::from).collect(),
        pagination,
    )))
}

#[utoipa::path(
    get,
    path = "/{id}/attendance",
    tag = "Students",
    operation_id = "listStudentAttendance",
    summary = "Attendance records of one student",
    params(("id" = i32, Path, description = "Student ID"), PageQuery),
    responses(
        (status = 200, description = "Attendance, newest first", body = Page<AttendanceResponse>),
        (status = 404, description = "Student not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query), fields(id))]
pub async fn list_student_attendance(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<AttendanceResponse>>, AppError> {
    let student = find_student(&state.db, &auth_user, id).await?;

    let select = attendance::Entity::find()
        .filter(attendance::Column::StudentId.eq(student.id))
        .order_by_desc(attendance::Column::Date);
    let (rows, pagination) = fetch_page(&state.db, select, &query).await?;

    Ok(Json(Page::new(
        rows.into_iter().map(AttendanceResponse::from).collect(),
        pagination,
    )))
}

/// Present and total attendance marks of a student.
pub(crate) async fn attendance_counts<C: ConnectionTrait>(
    db: &C,
    student_id: i32,
) -> Result<(u64, u64), AppError> {
    let base = attendance::Entity::find().filter(attendance::Column::StudentId.eq(student_id));
    let total = base.clone().count(db).await?;
    let present = base
        .filter(attendance::Column::Status.eq(AttendanceStatus::Present))
        .count(db)
        .await?;
    Ok((present, total))
}

#[utoipa::path(
    get,
    path = "/{id}/summary",
    tag = "Students",
    operation_id = "getStudentSummary",
    summary = "Attendance rate and results of one student",
    params(("id" = i32, Path, description = "Student ID")),
    responses(
        (status = 200, description = "Summary", body = StudentSummary),
        (status = 404, description = "Student not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn get_student_summary(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<StudentSummary>, AppError> {
    let student = find_student(&state.db, &auth_user, id).await?;
    let (present, total) = attendance_counts(&state.db, student.id).await?;

    let results = result::Entity::find()
        .filter(result::Column::StudentId.eq(student.id))
        .order_by_desc(result::Column::ExamDate)
        .all(&state.db)
        .await?;

    Ok(Json(StudentSummary {
        student: student_response(&state.db, student).await?,
        attendance_total: total,
        attendance_present: present,
        attendance_percentage: common::stats::attendance_percentage(present, total),
        results: results.into_iter().map(ResultResponse::from).collect(),
    }))
}
