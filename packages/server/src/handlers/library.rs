use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::Capability;
use common::library::{Fine, assess_fine};
use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, ExprTrait};
use sea_orm::*;
use tracing::instrument;

use super::users::search_condition;
use crate::entity::{book_issue, library_book, student};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::library::*;
use crate::models::shared::{Page, PageQuery};
use crate::state::AppState;
use crate::utils::clock;
use crate::utils::lookup::{find, find_visible};
use crate::utils::page::fetch_page;
use crate::utils::scope::visible;

#[utoipa::path(
    get,
    path = "/books",
    tag = "Library",
    operation_id = "listBooks",
    summary = "Search the catalogue",
    params(BookListQuery),
    responses(
        (status = 200, description = "Books by title", body = Page<BookResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user, query))]
pub async fn list_books(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<BookListQuery>,
) -> Result<Json<Page<BookResponse>>, AppError> {
    let page_query = PageQuery {
        page: query.page,
        per_page: query.per_page,
    };
    let mut select = library_book::Entity::find();

    if let Some(cond) = query.search.as_deref().and_then(|s| {
        search_condition(
            s,
            &[
                library_book::Column::Title,
                library_book::Column::Author,
                library_book::Column::Isbn,
            ],
        )
    }) {
        select = select.filter(cond);
    }
    if let Some(ref category) = query.category {
        select = select.filter(library_book::Column::Category.eq(category.trim()));
    }
    if query.available == Some(true) {
        select = select.filter(library_book::Column::AvailableCopies.gt(0));
    }

    let select = select
        .order_by_asc(library_book::Column::Title)
        .order_by_asc(library_book::Column::Id);
    let (rows, pagination) = fetch_page(&state.db, select, &page_query).await?;

    Ok(Json(Page::new(
        rows.into_iter().map(BookResponse::from).collect(),
        pagination,
    )))
}

#[utoipa::path(
    post,
    path = "/books",
    tag = "Library",
    operation_id = "createBook",
    summary = "Add a book to the catalogue",
    description = "Admin only. All copies start on the shelf.",
    request_body = CreateBookRequest,
    responses(
        (status = 201, description = "Book added", body = BookResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 409, description = "ISBN already catalogued (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(isbn = %payload.isbn))]
pub async fn create_book(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateBookRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require(Capability::ManageSchool)?;
    validate_create_book(&payload)?;

    let model = library_book::ActiveModel {
        title: Set(payload.title.trim().to_string()),
        author: Set(payload.author.trim().to_string()),
        isbn: Set(payload.isbn.trim().to_string()),
        category: Set(payload.category.trim().to_string()),
        publisher: Set(payload.publisher.trim().to_string()),
        publication_year: Set(payload.publication_year),
        total_copies: Set(payload.total_copies),
        available_copies: Set(payload.total_copies),
        shelf_location: Set(payload.shelf_location.trim().to_string()),
        added_on: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(AppError::on_conflict("A book with this ISBN already exists"))?;

    Ok((StatusCode::CREATED, Json(BookResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "Library",
    operation_id = "getBook",
    summary = "Get a book",
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book", body = BookResponse),
        (status = 404, description = "Book not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user), fields(id))]
pub async fn get_book(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<BookResponse>, AppError> {
    let model = find::<library_book::Entity, _>(&state.db, id, "Book").await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    patch,
    path = "/books/{id}",
    tag = "Library",
    operation_id = "updateBook",
    summary = "Update a catalogue entry",
    description = "Admin only. Available copies must stay between zero and the total.",
    params(("id" = i32, Path, description = "Book ID")),
    request_body = UpdateBookRequest,
    responses(
        (status = 200, description = "Book updated", body = BookResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Book not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn update_book(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateBookRequest>,
) -> Result<Json<BookResponse>, AppError> {
    auth_user.require(Capability::ManageSchool)?;
    validate_update_book(&payload)?;

    let txn = state.db.begin().await?;
    let existing = library_book::Entity::find_by_id(id)
        .lock_exclusive()
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Book not found".into()))?;
    if payload == UpdateBookRequest::default() {
        return Ok(Json(existing.into()));
    }

    let total = payload.total_copies.unwrap_or(existing.total_copies);
    let available = payload.available_copies.unwrap_or(existing.available_copies);
    validate_copies(total, available)?;

    let mut active: library_book::ActiveModel = existing.into();
    if let Some(title) = payload.title {
        active.title = Set(title.trim().to_string());
    }
    if let Some(author) = payload.author {
        active.author = Set(author.trim().to_string());
    }
    if let Some(category) = payload.category {
        active.category = Set(category.trim().to_string());
    }
    if let Some(publisher) = payload.publisher {
        active.publisher = Set(publisher.trim().to_string());
    }
    if let Some(year) = payload.publication_year {
        active.publication_year = Set(year);
    }
    if let Some(shelf) = payload.shelf_location {
        active.shelf_location = Set(shelf.trim().to_string());
    }
    active.total_copies = Set(total);
    active.available_copies = Set(available);

    let model = active.update(&txn).await?;
    txn.commit().await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    get,
    path = "/issues",
    tag = "Library",
    operation_id = "listBookIssues",
    summary = "List book issues",
    description = "Students see only their own loans.",
    params(IssueListQuery),
    responses(
        (status = 200, description = "Issues, newest first", body = Page<BookIssueResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query))]
pub async fn list_issues(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<IssueListQuery>,
) -> Result<Json<Page<BookIssueResponse>>, AppError> {
    let page_query = PageQuery {
        page: query.page,
        per_page: query.per_page,
    };
    let today = clock::today();
    let (scope, mut select) = visible::<book_issue::Entity>(&auth_user.actor, today);
    if scope.is_nothing() {
        return Ok(Json(Page::degraded(
            &page_query,
            auth_user.actor.profile_warning(),
        )));
    }

    if let Some(student_id) = query.student_id {
        select = select.filter(book_issue::Column::StudentId.eq(student_id));
    }
    if let Some(book_id) = query.book_id {
        select = select.filter(book_issue::Column::BookId.eq(book_id));
    }
    if let Some(returned) = query.returned {
        select = select.filter(book_issue::Column::IsReturned.eq(returned));
    }

    let select = select
        .order_by_desc(book_issue::Column::IssueDate)
        .order_by_desc(book_issue::Column::Id);
    let (rows, pagination) = fetch_page(&state.db, select, &page_query).await?;

    Ok(Json(Page::new(
        rows.into_iter()
            .map(|m| BookIssueResponse::new(m, today))
            .collect(),
        pagination,
    )))
}

#[utoipa::path(
    get,
    path = "/my-books",
    tag = "Library",
    operation_id = "listMyBooks",
    summary = "The calling student's loans",
    description = "Books still out first, by due date.",
    params(PageQuery),
    responses(
        (status = 200, description = "Loans", body = Page<BookIssueResponse>),
        (status = 403, description = "Not a student (PERMISSION_DENIED)", body = ErrorBody),
        (status = 422, description = "Student profile missing (PROFILE_MISSING)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query), fields(user_id = auth_user.user_id()))]
pub async fn my_books(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<BookIssueResponse>>, AppError> {
    let student_id = auth_user.require_student_profile()?;
    let today = clock::today();

    let select = book_issue::Entity::find()
        .filter(book_issue::Column::StudentId.eq(student_id))
        .order_by_asc(book_issue::Column::IsReturned)
        .order_by_asc(book_issue::Column::DueDate);
    let (rows, pagination) = fetch_page(&state.db, select, &query).await?;

    Ok(Json(Page::new(
        rows.into_iter()
            .map(|m| BookIssueResponse::new(m, today))
            .collect(),
        pagination,
    )))
}

#[utoipa::path(
    post,
    path = "/issues",
    tag = "Library",
    operation_id = "issueBook",
    summary = "Issue a book to a student",
    description = "Teachers and admins. Takes one copy off the shelf; refused when none are left.",
    request_body = IssueBookRequest,
    responses(
        (status = 201, description = "Book issued", body = BookIssueResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Book or student not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "No copies available (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(book_id = payload.book_id, student_id = payload.student_id))]
pub async fn issue_book(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<IssueBookRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require(Capability::IssueBooks)?;
    let today = clock::today();
    let (issue_date, due_date) = loan_period(payload.issue_date, payload.due_date, today)?;

    let txn = state.db.begin().await?;
    let student = find::<student::Entity, _>(&txn, payload.student_id, "Student").await?;

    let taken = library_book::Entity::update_many()
        .col_expr(
            library_book::Column::AvailableCopies,
            Expr::col(library_book::Column::AvailableCopies).sub(1),
        )
        .filter(library_book::Column::Id.eq(payload.book_id))
        .filter(library_book::Column::AvailableCopies.gt(0))
        .exec(&txn)
        .await?;
    if taken.rows_affected == 0 {
        find::<library_book::Entity, _>(&txn, payload.book_id, "Book").await?;
        return Err(AppError::Conflict("No copies of this book are available".into()));
    }

    let model = book_issue::ActiveModel {
        book_id: Set(payload.book_id),
        student_id: Set(student.id),
        issue_date: Set(issue_date),
        due_date: Set(due_date),
        return_date: Set(None),
        fine_amount: Set(Decimal::ZERO),
        is_returned: Set(false),
        issued_by: Set(Some(auth_user.user_id())),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    tracing::info!(issue_id = model.id, "Book issued");
    Ok((
        StatusCode::CREATED,
        Json(BookIssueResponse::new(model, today)),
    ))
}

#[utoipa::path(
    get,
    path = "/issues/{id}",
    tag = "Library",
    operation_id = "getBookIssue",
    summary = "Get a book issue",
    params(("id" = i32, Path, description = "Issue ID")),
    responses(
        (status = 200, description = "Issue with its current fine", body = BookIssueResponse),
        (status = 404, description = "Not found or not visible (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn get_issue(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<BookIssueResponse>, AppError> {
    let model =
        find_visible::<book_issue::Entity, _>(&state.db, &auth_user.actor, id, "Book issue")
            .await?;
    Ok(Json(BookIssueResponse::new(model, clock::today())))
}

#[utoipa::path(
    post,
    path = "/issues/{id}/return",
    tag = "Library",
    operation_id = "returnBook",
    summary = "Record a book return",
    description = "Stores the late fine, if any, and puts the copy back on the shelf.",
    params(("id" = i32, Path, description = "Issue ID")),
    request_body = ReturnBookRequest,
    responses(
        (status = 200, description = "Return recorded", body = BookIssueResponse),
        (status = 400, description = "Return before issue date (VALIDATION_ERROR)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Issue not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Already returned (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn return_book(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<ReturnBookRequest>,
) -> Result<Json<BookIssueResponse>, AppError> {
    auth_user.require(Capability::IssueBooks)?;
    let today = clock::today();

    let txn = state.db.begin().await?;
    let existing = book_issue::Entity::find_by_id(id)
        .lock_exclusive()
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Book issue not found".into()))?;
    if existing.is_returned {
        return Err(AppError::Conflict("Book has already been returned".into()));
    }

    let return_date = payload.return_date.unwrap_or(today);
    if return_date < existing.issue_date {
        return Err(AppError::Validation(
            "Return date must not be before the issue date".into(),
        ));
    }
    let fine = match assess_fine(existing.due_date, Some(return_date), true, today) {
        Fine::Recorded(amount) => amount,
        _ => Decimal::ZERO,
    };
    let book_id = existing.book_id;

    let mut active: book_issue::ActiveModel = existing.into();
    active.return_date = Set(Some(return_date));
    active.is_returned = Set(true);
    active.fine_amount = Set(fine);
    let model = active.update(&txn).await?;

    library_book::Entity::update_many()
        .col_expr(
            library_book::Column::AvailableCopies,
            Expr::col(library_book::Column::AvailableCopies).add(1),
        )
        .filter(library_book::Column::Id.eq(book_id))
        .filter(
            Expr::col(library_book::Column::AvailableCopies)
                .lt(Expr::col(library_book::Column::TotalCopies)),
        )
        .exec(&txn)
        .await?;
    txn.commit().await?;

    tracing::info!(issue_id = model.id, fine = %model.fine_amount, "Book returned");
    Ok(Json(BookIssueResponse::new(model, today)))
}
