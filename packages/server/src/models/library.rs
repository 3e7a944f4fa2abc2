use chrono::{DateTime, Days, NaiveDate, Utc};
use common::library::{Fine, assess_fine, days_late};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::shared::{double_option, validate_text, validate_title};
use crate::entity::{book_issue, library_book};
use crate::error::AppError;

/// Loan period applied when an issue does not name a due date.
pub const DEFAULT_LOAN_DAYS: u64 = 14;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateBookRequest {
    #[schema(example = "A Brief History of Time")]
    pub title: String,
    pub author: String,
    #[schema(example = "978-0553380163")]
    pub isbn: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub publisher: String,
    pub publication_year: Option<i32>,
    #[schema(example = 3)]
    pub total_copies: i32,
    #[serde(default)]
    pub shelf_location: String,
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateBookRequest {
    pub title: Option<String>,
    pub author: Option<String>,
    pub category: Option<String>,
    pub publisher: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<i32>)]
    pub publication_year: Option<Option<i32>>,
    pub total_copies: Option<i32>,
    /// Must stay within `0..=total_copies`.
    pub available_copies: Option<i32>,
    pub shelf_location: Option<String>,
}

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BookListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    /// Matches title, author or ISBN.
    pub search: Option<String>,
    pub category: Option<String>,
    /// Only books with at least one copy on the shelf.
    pub available: Option<bool>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct BookResponse {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub category: String,
    pub publisher: String,
    pub publication_year: Option<i32>,
    pub total_copies: i32,
    pub available_copies: i32,
    pub is_available: bool,
    pub shelf_location: String,
    pub added_on: DateTime<Utc>,
}

impl From<library_book::Model> for BookResponse {
    fn from(m: library_book::Model) -> Self {
        Self {
            is_available: m.is_available(),
            id: m.id,
            title: m.title,
            author: m.author,
            isbn: m.isbn,
            category: m.category,
            publisher: m.publisher,
            publication_year: m.publication_year,
            total_copies: m.total_copies,
            available_copies: m.available_copies,
            shelf_location: m.shelf_location,
            added_on: m.added_on,
        }
    }
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct IssueBookRequest {
    pub book_id: i32,
    pub student_id: i32,
    /// Defaults to today.
    pub issue_date: Option<NaiveDate>,
    /// Defaults to fourteen days after the issue date.
    pub due_date: Option<NaiveDate>,
}

#[derive(Deserialize, Default, utoipa::ToSchema)]
pub struct ReturnBookRequest {
    /// Defaults to today.
    pub return_date: Option<NaiveDate>,
}

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct IssueListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    pub student_id: Option<i32>,
    pub book_id: Option<i32>,
    pub returned: Option<bool>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct BookIssueResponse {
    pub id: i32,
    pub book_id: i32,
    pub student_id: i32,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub is_returned: bool,
    pub issued_by: Option<i32>,
    /// Fine stored when a late return was recorded.
    #[schema(value_type = String)]
    pub fine_amount: Decimal,
    /// Stored fine for returned books, otherwise what an unreturned book
    /// has accrued so far.
    #[schema(value_type = String)]
    pub current_fine: Decimal,
    pub days_late: i64,
    pub is_overdue: bool,
}

impl BookIssueResponse {
    pub fn new(m: book_issue::Model, today: NaiveDate) -> Self {
        let current_fine = match assess_fine(m.due_date, m.return_date, m.is_returned, today) {
            Fine::Accruing(amount) => amount,
            _ => m.fine_amount,
        };
        Self {
            current_fine,
            days_late: days_late(m.due_date, m.return_date, today),
            is_overdue: !m.is_returned && today > m.due_date,
            id: m.id,
            book_id: m.book_id,
            student_id: m.student_id,
            issue_date: m.issue_date,
            due_date: m.due_date,
            return_date: m.return_date,
            is_returned: m.is_returned,
            issued_by: m.issued_by,
            fine_amount: m.fine_amount,
        }
    }
}

pub fn validate_create_book(req: &CreateBookRequest) -> Result<(), AppError> {
    validate_title(&req.title)?;
    validate_text("Author", &req.author, 200)?;
    validate_text("ISBN", &req.isbn, 20)?;
    if req.total_copies < 1 {
        return Err(AppError::Validation(
            "A book needs at least one copy".into(),
        ));
    }
    Ok(())
}

pub fn validate_update_book(req: &UpdateBookRequest) -> Result<(), AppError> {
    if let Some(ref title) = req.title {
        validate_title(title)?;
    }
    if let Some(ref author) = req.author {
        validate_text("Author", author, 200)?;
    }
    Ok(())
}

/// `0 <= available <= total`.
pub fn validate_copies(total: i32, available: i32) -> Result<(), AppError> {
    if total < 0 || available < 0 || available > total {
        return Err(AppError::Validation(format!(
            "Available copies must be between 0 and {total}"
        )));
    }
    Ok(())
}

/// Issue and due dates, filling in the defaults.
pub fn loan_period(
    issue_date: Option<NaiveDate>,
    due_date: Option<NaiveDate>,
    today: NaiveDate,
) -> Result<(NaiveDate, NaiveDate), AppError> {
    let issued = issue_date.unwrap_or(today);
    let due = match due_date {
        Some(due) => due,
        None => issued
            .checked_add_days(Days::new(DEFAULT_LOAN_DAYS))
            .ok_or_else(|| AppError::Validation("Issue date is out of range".into()))?,
    };
    if due < issued {
        return Err(AppError::Validation(
            "Due date must not be before the issue date".into(),
        ));
    }
    Ok((issued, due))
}
