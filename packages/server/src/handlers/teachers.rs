use std::collections::{BTreeSet, HashMap};

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::Role;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{subject, teacher, teacher_subject, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::people::*;
use crate::models::shared::{Page, PageQuery};
use crate::state::AppState;
use crate::utils::clock;
use crate::utils::lookup::{accounts, find};
use crate::utils::page::fetch_page;

/// Subjects taught by each of `teacher_ids`.
pub(crate) async fn subjects_by_teacher<C: ConnectionTrait>(
    db: &C,
    teacher_ids: &[i32],
) -> Result<HashMap<i32, Vec<SubjectRef>>, AppError> {
    if teacher_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let links = teacher_subject::Entity::find()
        .filter(teacher_subject::Column::TeacherId.is_in(teacher_ids.iter().copied()))
        .all(db)
        .await?;
    let subject_ids: BTreeSet<i32> = links.iter().map(|l| l.subject_id).collect();
    let subjects: HashMap<i32, subject::Model> = subject::Entity::find()
        .filter(subject::Column::Id.is_in(subject_ids))
        .order_by_asc(subject::Column::Name)
        .all(db)
        .await?
        .into_iter()
        .map(|s| (s.id, s))
        .collect();

    let mut out: HashMap<i32, Vec<SubjectRef>> = HashMap::new();
    for link in links {
        if let Some(s) = subjects.get(&link.subject_id) {
            out.entry(link.teacher_id)
                .or_default()
                .push(SubjectRef::from(s.clone()));
        }
    }
    for list in out.values_mut() {
        list.sort_by(|a, b| a.name.cmp(&b.name));
    }
    Ok(out)
}

async fn teacher_response<C: ConnectionTrait>(
    db: &C,
    model: teacher::Model,
) -> Result<TeacherResponse, AppError> {
    let account = user::Entity::find_by_id(model.user_id).one(db).await?;
    let mut subjects = subjects_by_teacher(db, &[model.id]).await?;
    let taught = subjects.remove(&model.id).unwrap_or_default();
    Ok(TeacherResponse::new(model, account.as_ref(), taught))
}

/// Replace the subject links of `teacher_id` with `subject_ids`.
async fn replace_subjects<C: ConnectionTrait>(
    db: &C,
    teacher_id: i32,
    subject_ids: &[i32],
) -> Result<(), AppError> {
    teacher_subject::Entity::delete_many()
        .filter(teacher_subject::Column::TeacherId.eq(teacher_id))
        .exec(db)
        .await?;

    let unique: BTreeSet<i32> = subject_ids.iter().copied().collect();
    for subject_id in unique {
        teacher_subject::ActiveModel {
            teacher_id: Set(teacher_id),
            subject_id: Set(subject_id),
        }
        .insert(db)
        .await
        .map_err(AppError::on_conflict("Subject already assigned"))?;
    }
    Ok(())
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Teachers",
    operation_id = "listTeachers",
    summary = "List teacher profiles",
    params(TeacherListQuery),
    responses(
        (status = 200, description = "Teachers", body = Page<TeacherResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user, query))]
pub async fn list_teachers(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<TeacherListQuery>,
) -> Result<Json<Page<TeacherResponse>>, AppError> {
    let mut select = teacher::Entity::find();
    if let Some(active) = query.is_active {
        select = select.filter(teacher::Column::IsActive.eq(active));
    }
    if let Some(subject_id) = query.subject_id {
        select = select.filter(
            teacher::Column::Id.in_subquery(
                sea_orm::sea_query::Query::select()
                    .column(teacher_subject::Column::TeacherId)
                    .from(teacher_subject::Entity)
                    .and_where(teacher_subject::Column::SubjectId.eq(subject_id))
                    .to_owned(),
            ),
        );
    }

    let page_query = PageQuery {
        page: query.page,
        per_page: query.per_page,
    };
    let (rows, pagination) =
        fetch_page(&state.db, select.order_by_asc(teacher::Column::Id), &page_query).await?;

    let ids: Vec<i32> = rows.iter().map(|t| t.id).collect();
    let users = accounts(&state.db, rows.iter().map(|t| t.user_id)).await?;
    let mut subjects = subjects_by_teacher(&state.db, &ids).await?;

    let data = rows
        .into_iter()
        .map(|t| {
            let taught = subjects.remove(&t.id).unwrap_or_default();
            let account = users.get(&t.user_id);
            TeacherResponse::new(t, account, taught)
        })
        .collect();

    Ok(Json(Page::new(data, pagination)))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Teachers",
    operation_id = "createTeacher",
    summary = "Create a teacher profile for a teacher account",
    request_body = CreateTeacherRequest,
    responses(
        (status = 201, description = "Teacher created", body = TeacherResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Profile exists (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = payload.user_id))]
pub async fn create_teacher(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateTeacherRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_admin()?;
    validate_experience(payload.experience_years)?;

    let account = find::<user::Entity, _>(&state.db, payload.user_id, "User").await?;
    if account.role != Role::Teacher {
        return Err(AppError::Validation(
            "Teacher profiles can only extend teacher accounts".into(),
        ));
    }

    let txn = state.db.begin().await?;
    let model = teacher::ActiveModel {
        user_id: Set(account.id),
        qualification: Set(payload.qualification),
        experience_years: Set(payload.experience_years),
        joining_date: Set(payload.joining_date.unwrap_or_else(clock::today)),
        is_active: Set(true),
        ..Default::default()
    }
    .insert(&txn)
    .await
    .map_err(AppError::on_conflict("Teacher profile already exists"))?;

    replace_subjects(&txn, model.id, &payload.subject_ids).await?;
    let response = teacher_response(&txn, model).await?;
    txn.commit().await?;

    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Teachers",
    operation_id = "getTeacher",
    summary = "Get a teacher profile",
    params(("id" = i32, Path, description = "Teacher ID")),
    responses(
        (status = 200, description = "Teacher", body = TeacherResponse),
        (status = 404, description = "Teacher not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user), fields(id))]
pub async fn get_teacher(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<TeacherResponse>, AppError> {
    let model = find::<teacher::Entity, _>(&state.db, id, "Teacher").await?;
    Ok(Json(teacher_response(&state.db, model).await?))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Teachers",
    operation_id = "updateTeacher",
    summary = "Update a teacher profile",
    description = "Admin only. `is_active=false` soft-deactivates the profile.",
    params(("id" = i32, Path, description = "Teacher ID")),
    request_body = UpdateTeacherRequest,
    responses(
        (status = 200, description = "Teacher updated", body = TeacherResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Teacher not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn update_teacher(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateTeacherRequest>,
) -> Result<Json<TeacherResponse>, AppError> {
    auth_user.require_admin()?;
    if let Some(years) = payload.experience_years {
        validate_experience(years)?;
    }

    let existing = find::<teacher::Entity, _>(&state.db, id, "Teacher").await?;
    if payload == UpdateTeacherRequest::default() {
        return Ok(Json(teacher_response(&state.db, existing).await?));
    }

    let mut active: teacher::ActiveModel = existing.into();
    if let Some(qualification) = payload.qualification {
        active.qualification = Set(qualification);
    }
    if let Some(years) = payload.experience_years {
        active.experience_years = Set(years);
    }
    if let Some(date) = payload.joining_date {
        active.joining_date = Set(date);
    }
    if let Some(is_active) = payload.is_active {
        active.is_active = Set(is_active);
    }

    let model = active.update(&state.db).await?;
    Ok(Json(teacher_response(&state.db, model).await?))
}

#[utoipa::path(
    put,
    path = "/{id}/subjects",
    tag = "Teachers",
    operation_id = "setTeacherSubjects",
    summary = "Replace the subjects a teacher teaches",
    params(("id" = i32, Path, description = "Teacher ID")),
    request_body = SetTeacherSubjectsRequest,
    responses(
        (status = 200, description = "Teacher with new subjects", body = TeacherResponse),
        (status = 400, description = "Unknown subject (VALIDATION_ERROR)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Teacher not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id, count = payload.subject_ids.len()))]
pub async fn set_teacher_subjects(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<SetTeacherSubjectsRequest>,
) -> Result<Json<TeacherResponse>, AppError> {
    auth_user.require_admin()?;

    let txn = state.db.begin().await?;
    let model = find::<teacher::Entity, _>(&txn, id, "Teacher").await?;
    replace_subjects(&txn, model.id, &payload.subject_ids).await?;
    let response = teacher_response(&txn, model).await?;
    txn.commit().await?;

    Ok(Json(response))
}
