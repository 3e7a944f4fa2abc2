use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A student's answer to an assignment. One per `(assignment, student)`.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "submission")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique_key = "assignment_student")]
    pub assignment_id: i32,
    #[sea_orm(belongs_to, from = "assignment_id", to = "id", on_delete = "Cascade")]
    pub assignment: HasOne<super::assignment::Entity>,

    #[sea_orm(unique_key = "assignment_student")]
    pub student_id: i32,
    #[sea_orm(belongs_to, from = "student_id", to = "id", on_delete = "Cascade")]
    pub student: HasOne<super::student::Entity>,

    /// Opaque reference into external file storage.
    pub file: String,
    pub submitted_at: DateTimeUtc,
    #[sea_orm(column_type = "Text", nullable)]
    pub remarks: Option<String>,

    #[sea_orm(column_type = "Decimal(Some((6, 2)))", nullable)]
    pub marks_obtained: Option<Decimal>,
    pub is_late: bool,
    pub graded_at: Option<DateTimeUtc>,

    pub graded_by: Option<i32>,
    #[sea_orm(belongs_to, from = "graded_by", to = "id", on_delete = "SetNull")]
    pub grader: HasOne<super::teacher::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
