use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Exam marks for one student in one subject. Unique per
/// `(student, subject, exam_name)`; see `seed::ensure_indexes`.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "result")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub student_id: i32,
    #[sea_orm(belongs_to, from = "student_id", to = "id", on_delete = "Cascade")]
    pub student: HasOne<super::student::Entity>,

    pub subject_id: Option<i32>,
    #[sea_orm(belongs_to, from = "subject_id", to = "id", on_delete = "SetNull")]
    pub subject: HasOne<super::subject::Entity>,

    #[sea_orm(column_type = "Decimal(Some((6, 2)))")]
    pub marks: Decimal,
    pub total_marks: i32,
    pub exam_name: String,
    pub exam_date: Date,
    /// Derived from the percentage when not given; never recomputed once set.
    pub grade: Option<String>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
