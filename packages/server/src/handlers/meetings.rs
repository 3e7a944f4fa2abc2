use std::collections::{BTreeSet, HashMap};

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::Capability;
use common::capability::can_update_meeting;
use sea_orm::sea_query::Query as SeaQuery;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{meeting, meeting_participant};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::meeting::*;
use crate::models::shared::{Page, PageQuery};
use crate::state::AppState;
use crate::utils::clock;
use crate::utils::lookup::find_visible;
use crate::utils::page::fetch_page;
use crate::utils::scope::visible;

/// Rows per portal section.
const PORTAL_LIMIT: u64 = 20;

async fn participants_by_meeting<C: ConnectionTrait>(
    db: &C,
    meeting_ids: &[i32],
) -> Result<HashMap<i32, Vec<i32>>, AppError> {
    if meeting_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows = meeting_participant::Entity::find()
        .filter(meeting_participant::Column::MeetingId.is_in(meeting_ids.to_vec()))
        .order_by_asc(meeting_participant::Column::UserId)
        .all(db)
        .await?;

    let mut map: HashMap<i32, Vec<i32>> = HashMap::new();
    for row in rows {
        map.entry(row.meeting_id).or_default().push(row.user_id);
    }
    Ok(map)
}

async fn meeting_responses<C: ConnectionTrait>(
    db: &C,
    rows: Vec<meeting::Model>,
) -> Result<Vec<MeetingResponse>, AppError> {
    let ids: Vec<i32> = rows.iter().map(|m| m.id).collect();
    let mut participants = participants_by_meeting(db, &ids).await?;
    let now = clock::now_naive();
    Ok(rows
        .into_iter()
        .map(|m| {
            let invited = participants.remove(&m.id).unwrap_or_default();
            MeetingResponse::new(m, invited, now)
        })
        .collect())
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Meetings",
    operation_id = "listMeetings",
    summary = "List meetings",
    description = "Meetings the caller is invited to; admins also see those they organised.",
    params(MeetingListQuery),
    responses(
        (status = 200, description = "Meetings, latest first", body = Page<MeetingResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query))]
pub async fn list_meetings(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<MeetingListQuery>,
) -> Result<Json<Page<MeetingResponse>>, AppError> {
    let page_query = PageQuery {
        page: query.page,
        per_page: query.per_page,
    };
    let (_, mut select) = visible::<meeting::Entity>(&auth_user.actor, clock::today());

    if let Some(status) = query.status {
        select = select.filter(meeting::Column::Status.eq(status));
    }
    if let Some(meeting_type) = query.meeting_type {
        select = select.filter(meeting::Column::MeetingType.eq(meeting_type));
    }
    if let Some(from) = query.from {
        select = select.filter(meeting::Column::MeetingDate.gte(from));
    }

    let select = select
        .order_by_desc(meeting::Column::MeetingDate)
        .order_by_desc(meeting::Column::StartTime);
    let (rows, pagination) = fetch_page(&state.db, select, &page_query).await?;

    Ok(Json(Page::new(
        meeting_responses(&state.db, rows).await?,
        pagination,
    )))
}

#[utoipa::path(
    get,
    path = "/portal",
    tag = "Meetings",
    operation_id = "meetingPortal",
    summary = "Meeting overview for the caller",
    description = "Organised, invited, upcoming and today's meetings, and whether the caller may create one.",
    responses(
        (status = 200, description = "Portal", body = MeetingPortalResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id()))]
pub async fn meeting_portal(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<MeetingPortalResponse>, AppError> {
    let user_id = auth_user.user_id();
    let today = clock::today();

    let organized = meeting::Entity::find()
        .filter(meeting::Column::OrganizedBy.eq(user_id))
        .order_by_desc(meeting::Column::MeetingDate)
        .limit(PORTAL_LIMIT)
        .all(&state.db)
        .await?;

    let invited = meeting::Entity::find()
        .filter(
            meeting::Column::Id.in_subquery(
                SeaQuery::select()
                    .column(meeting_participant::Column::MeetingId)
                    .from(meeting_participant::Entity)
                    .and_where(meeting_participant::Column::UserId.eq(user_id))
                    .to_owned(),
            ),
        )
        .order_by_desc(meeting::Column::MeetingDate)
        .limit(PORTAL_LIMIT)
        .all(&state.db)
        .await?;

    let (_, mine) = visible::<meeting::Entity>(&auth_user.actor, today);
    let now = clock::now_naive();
    let upcoming = mine
        .clone()
        .filter(meeting::Column::Status.eq(common::MeetingStatus::Scheduled))
        .filter(
            Condition::any()
                .add(meeting::Column::MeetingDate.gt(now.date()))
                .add(
                    Condition::all()
                        .add(meeting::Column::MeetingDate.eq(now.date()))
                        .add(meeting::Column::StartTime.gt(now.time())),
                ),
        )
        .order_by_asc(meeting::Column::MeetingDate)
        .order_by_asc(meeting::Column::StartTime)
        .limit(PORTAL_LIMIT)
        .all(&state.db)
        .await?;
    let todays = mine
        .filter(meeting::Column::MeetingDate.eq(today))
        .order_by_asc(meeting::Column::StartTime)
        .all(&state.db)
        .await?;

    Ok(Json(MeetingPortalResponse {
        organized: meeting_responses(&state.db, organized).await?,
        invited: meeting_responses(&state.db, invited).await?,
        upcoming: meeting_responses(&state.db, upcoming).await?,
        today: meeting_responses(&state.db, todays).await?,
        can_create: auth_user.actor.can(Capability::CreateMeeting),
    }))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Meetings",
    operation_id = "createMeeting",
    summary = "Schedule a meeting",
    description = "Admin and staff only. The caller becomes the organiser.",
    request_body = CreateMeetingRequest,
    responses(
        (status = 201, description = "Meeting created", body = MeetingResponse),
        (status = 400, description = "Validation error or unknown participant (VALIDATION_ERROR)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(title = %payload.title))]
pub async fn create_meeting(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateMeetingRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require(Capability::CreateMeeting)?;
    validate_create_meeting(&payload)?;

    let organizer = auth_user.user_id();
    let participants: BTreeSet<i32> = payload
        .participant_ids
        .iter()
        .copied()
        .filter(|id| *id != organizer)
        .collect();
    let now = chrono::Utc::now();

    let txn = state.db.begin().await?;
    let model = meeting::ActiveModel {
        title: Set(payload.title.trim().to_string()),
        meeting_type: Set(payload.meeting_type),
        description: Set(payload.description),
        topic: Set(payload.topic.trim().to_string()),
        meeting_date: Set(payload.meeting_date),
        start_time: Set(payload.start_time),
        end_time: Set(payload.end_time),
        location: Set(payload.location.trim().to_string()),
        organized_by: Set(organizer),
        status: Set(common::MeetingStatus::Scheduled),
        is_virtual: Set(payload.is_virtual),
        meeting_link: Set(payload.meeting_link),
        meeting_notes: Set(None),
        action_items: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    for user_id in &participants {
        meeting_participant::ActiveModel {
            meeting_id: Set(model.id),
            user_id: Set(*user_id),
        }
        .insert(&txn)
        .await
        .map_err(AppError::on_conflict("Participant listed twice"))?;
    }
    txn.commit().await?;

    tracing::info!(
        meeting_id = model.id,
        participants = participants.len(),
        "Meeting scheduled"
    );
    Ok((
        StatusCode::CREATED,
        Json(MeetingResponse::new(
            model,
            participants.into_iter().collect(),
            clock::now_naive(),
        )),
    ))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Meetings",
    operation_id = "getMeeting",
    summary = "Get a meeting",
    params(("id" = i32, Path, description = "Meeting ID")),
    responses(
        (status = 200, description = "Meeting", body = MeetingResponse),
        (status = 404, description = "Not found or not visible (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn get_meeting(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<MeetingResponse>, AppError> {
    let model =
        find_visible::<meeting::Entity, _>(&state.db, &auth_user.actor, id, "Meeting").await?;
    let mut responses = meeting_responses(&state.db, vec![model]).await?;
    responses
        .pop()
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Meeting not found".into()))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Meetings",
    operation_id = "updateMeeting",
    summary = "Update notes, action items or status",
    description = "Organiser only. Any status may be set; nothing advances on its own.",
    params(("id" = i32, Path, description = "Meeting ID")),
    request_body = UpdateMeetingRequest,
    responses(
        (status = 200, description = "Meeting updated", body = MeetingResponse),
        (status = 403, description = "Not the organiser (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Not found or not visible (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn update_meeting(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateMeetingRequest>,
) -> Result<Json<MeetingResponse>, AppError> {
    let existing =
        find_visible::<meeting::Entity, _>(&state.db, &auth_user.actor, id, "Meeting").await?;
    if !can_update_meeting(&auth_user.actor, existing.organized_by) {
        return Err(AppError::PermissionDenied);
    }

    let model = if payload == UpdateMeetingRequest::default() {
        existing
    } else {
        let mut active: meeting::ActiveModel = existing.into();
        if let Some(status) = payload.status {
            active.status = Set(status);
        }
        if let Some(notes) = payload.meeting_notes {
            active.meeting_notes = Set(notes);
        }
        if let Some(items) = payload.action_items {
            active.action_items = Set(items);
        }
        active.updated_at = Set(chrono::Utc::now());
        active.update(&state.db).await?
    };

    let mut responses = meeting_responses(&state.db, vec![model]).await?;
    responses
        .pop()
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Meeting not found".into()))
}
