use std::collections::HashMap;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{classroom, student, subject};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::people::StudentResponse;
use crate::models::school::*;
use crate::models::shared::{Page, PageQuery};
use crate::state::AppState;
use crate::utils::lookup::{accounts, find};
use crate::utils::page::fetch_page;

/// Number of students enrolled in each of `classroom_ids`.
async fn student_counts<C: ConnectionTrait>(
    db: &C,
    classroom_ids: &[i32],
) -> Result<HashMap<i32, u64>, AppError> {
    if classroom_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows: Vec<(Option<i32>, i64)> = student::Entity::find()
        .select_only()
        .column(student::Column::ClassroomId)
        .column_as(student::Column::Id.count(), "count")
        .filter(student::Column::ClassroomId.is_in(classroom_ids.iter().copied()))
        .group_by(student::Column::ClassroomId)
        .into_tuple()
        .all(db)
        .await?;
    Ok(rows
        .into_iter()
        .filter_map(|(id, count)| id.map(|id| (id, std::cmp::Ord::max(count, 0) as u64)))
        .collect())
}

async fn classroom_response<C: ConnectionTrait>(
    db: &C,
    model: classroom::Model,
) -> Result<ClassroomResponse, AppError> {
    let counts = student_counts(db, &[model.id]).await?;
    let count = counts.get(&model.id).copied().unwrap_or(0);
    Ok(ClassroomResponse::new(model, count))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Classrooms",
    operation_id = "listClassrooms",
    summary = "List classrooms",
    params(PageQuery),
    responses(
        (status = 200, description = "Classrooms", body = Page<ClassroomResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user, query))]
pub async fn list_classrooms(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<ClassroomResponse>>, AppError> {
    let select = classroom::Entity::find()
        .order_by_asc(classroom::Column::Name)
        .order_by_asc(classroom::Column::Section);
    let (rows, pagination) = fetch_page(&state.db, select, &query).await?;

    let ids: Vec<i32> = rows.iter().map(|c| c.id).collect();
    let counts = student_counts(&state.db, &ids).await?;
    let data = rows
        .into_iter()
        .map(|c| {
            let count = counts.get(&c.id).copied().unwrap_or(0);
            ClassroomResponse::new(c, count)
        })
        .collect();

    Ok(Json(Page::new(data, pagination)))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Classrooms",
    operation_id = "createClassroom",
    summary = "Create a classroom",
    request_body = CreateClassroomRequest,
    responses(
        (status = 201, description = "Classroom created", body = ClassroomResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 409, description = "Name and section already exist (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(name = %payload.name))]
pub async fn create_classroom(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateClassroomRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_admin()?;
    validate_create_classroom(&payload)?;

    let model = classroom::ActiveModel {
        name: Set(payload.name.trim().to_string()),
        section: Set(payload.section.map(|s| s.trim().to_string())),
        class_teacher_id: Set(payload.class_teacher_id),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(AppError::on_conflict("Classroom already exists"))?;

    Ok((StatusCode::CREATED, Json(ClassroomResponse::new(model, 0))))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Classrooms",
    operation_id = "getClassroom",
    summary = "Get a classroom",
    params(("id" = i32, Path, description = "Classroom ID")),
    responses(
        (status = 200, description = "Classroom", body = ClassroomResponse),
        (status = 404, description = "Classroom not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user), fields(id))]
pub async fn get_classroom(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ClassroomResponse>, AppError> {
    let model = find::<classroom::Entity, _>(&state.db, id, "Classroom").await?;
    Ok(Json(classroom_response(&state.db, model).await?))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Classrooms",
    operation_id = "updateClassroom",
    summary = "Update a classroom",
    params(("id" = i32, Path, description = "Classroom ID")),
    request_body = UpdateClassroomRequest,
    responses(
        (status = 200, description = "Classroom updated", body = ClassroomResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Classroom not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Name and section already exist (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn update_classroom(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateClassroomRequest>,
) -> Result<Json<ClassroomResponse>, AppError> {
    auth_user.require_admin()?;
    validate_update_classroom(&payload)?;

    let existing = find::<classroom::Entity, _>(&state.db, id, "Classroom").await?;
    if payload == UpdateClassroomRequest::default() {
        return Ok(Json(classroom_response(&state.db, existing).await?));
    }

    let mut active: classroom::ActiveModel = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(section) = payload.section {
        active.section = Set(section.map(|s| s.trim().to_string()));
    }
    if let Some(teacher_id) = payload.class_teacher_id {
        active.class_teacher_id = Set(teacher_id);
    }

    let model = active
        .update(&state.db)
        .await
        .map_err(AppError::on_conflict("Classroom already exists"))?;
    Ok(Json(classroom_response(&state.db, model).await?))
}

#[utoipa::path(
    get,
    path = "/{id}/students",
    tag = "Classrooms",
    operation_id = "listClassroomStudents",
    summary = "Students enrolled in a classroom",
    description = "Admins and teachers only.",
    params(("id" = i32, Path, description = "Classroom ID"), PageQuery),
    responses(
        (status = 200, description = "Students by roll number", body = Page<StudentResponse>),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Classroom not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query), fields(id))]
pub async fn list_classroom_students(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<StudentResponse>>, AppError> {
    if auth_user.actor.is_student() {
        return Err(AppError::PermissionDenied);
    }
    let classroom = find::<classroom::Entity, _>(&state.db, id, "Classroom").await?;

    let select = student::Entity::find()
        .filter(student::Column::ClassroomId.eq(classroom.id))
        .order_by_asc(student::Column::RollNo);
    let (rows, pagination) = fetch_page(&state.db, select, &query).await?;

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
    get,
    path = "/",
    tag = "Subjects",
    operation_id = "listSubjects",
    summary = "List subjects",
    params(PageQuery),
    responses(
        (status = 200, description = "Subjects by name", body = Page<SubjectResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user, query))]
pub async fn list_subjects(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<SubjectResponse>>, AppError> {
    let select = subject::Entity::find().order_by_asc(subject::Column::Name);
    let (rows, pagination) = fetch_page(&state.db, select, &query).await?;
    Ok(Json(Page::new(
        rows.into_iter().map(SubjectResponse::from).collect(),
        pagination,
    )))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Subjects",
    operation_id = "createSubject",
    summary = "Create a subject",
    request_body = CreateSubjectRequest,
    responses(
        (status = 201, description = "Subject created", body = SubjectResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 409, description = "Name or code taken (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(name = %payload.name))]
pub async fn create_subject(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateSubjectRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_admin()?;
    validate_create_subject(&payload)?;

    let model = subject::ActiveModel {
        name: Set(payload.name.trim().to_string()),
        code: Set(payload.code.map(|c| c.trim().to_string())),
        description: Set(payload.description),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(AppError::on_conflict("Subject name or code already exists"))?;

    Ok((StatusCode::CREATED, Json(SubjectResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Subjects",
    operation_id = "getSubject",
    summary = "Get a subject",
    params(("id" = i32, Path, description = "Subject ID")),
    responses(
        (status = 200, description = "Subject", body = SubjectResponse),
        (status = 404, description = "Subject not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user), fields(id))]
pub async fn get_subject(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<SubjectResponse>, AppError> {
    let model = find::<subject::Entity, _>(&state.db, id, "Subject").await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Subjects",
    operation_id = "updateSubject",
    summary = "Update a subject",
    params(("id" = i32, Path, description = "Subject ID")),
    request_body = UpdateSubjectRequest,
    responses(
        (status = 200, description = "Subject updated", body = SubjectResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Subject not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Name or code taken (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn update_subject(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateSubjectRequest>,
) -> Result<Json<SubjectResponse>, AppError> {
    auth_user.require_admin()?;
    validate_update_subject(&payload)?;

    let existing = find::<subject::Entity, _>(&state.db, id, "Subject").await?;
    if payload == UpdateSubjectRequest::default() {
        return Ok(Json(existing.into()));
    }

    let mut active: subject::ActiveModel = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(code) = payload.code {
        active.code = Set(code.map(|c| c.trim().to_string()));
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }

    let model = active
        .update(&state.db)
        .await
        .map_err(AppError::on_conflict("Subject name or code already exists"))?;
    Ok(Json(model.into()))
}
