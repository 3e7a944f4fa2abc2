use common::AttendanceStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One attendance mark. Unique per `(student, date, subject)`; the index
/// treats a missing subject as a value so a whole-day mark is unique too.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "attendance")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub student_id: i32,
    #[sea_orm(belongs_to, from = "student_id", to = "id", on_delete = "Cascade")]
    pub student: HasOne<super::student::Entity>,

    pub subject_id: Option<i32>,
    #[sea_orm(belongs_to, from = "subject_id", to = "id", on_delete = "SetNull")]
    pub subject: HasOne<super::subject::Entity>,

    pub date: Date,
    pub status: AttendanceStatus,

    pub marked_by: Option<i32>,
    #[sea_orm(belongs_to, from = "marked_by", to = "id", on_delete = "SetNull")]
    pub marker: HasOne<super::teacher::Entity>,

    #[sea_orm(column_type = "Text", nullable)]
    pub remarks: Option<String>,
    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
