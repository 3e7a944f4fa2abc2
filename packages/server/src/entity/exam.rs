use common::ExamType;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "exam")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,
    pub exam_type: ExamType,

    pub subject_id: i32,
    #[sea_orm(belongs_to, from = "subject_id", to = "id", on_delete = "Cascade")]
    pub subject: HasOne<super::subject::Entity>,

    pub classroom_id: i32,
    #[sea_orm(belongs_to, from = "classroom_id", to = "id", on_delete = "Cascade")]
    pub classroom: HasOne<super::classroom::Entity>,

    pub date: Date,
    pub start_time: Time,
    /// Minutes.
    pub duration: i32,
    pub total_marks: i32,
    #[sea_orm(column_type = "Text")]
    pub instructions: String,

    pub created_by: Option<i32>,
    #[sea_orm(belongs_to, from = "created_by", to = "id", on_delete = "SetNull")]
    pub author: HasOne<super::teacher::Entity>,

    pub is_published: bool,
    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
