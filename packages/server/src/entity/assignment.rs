use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "assignment")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,

    pub subject_id: Option<i32>,
    #[sea_orm(belongs_to, from = "subject_id", to = "id", on_delete = "SetNull")]
    pub subject: HasOne<super::subject::Entity>,

    pub classroom_id: Option<i32>,
    #[sea_orm(belongs_to, from = "classroom_id", to = "id", on_delete = "SetNull")]
    pub classroom: HasOne<super::classroom::Entity>,

    pub uploaded_by: Option<i32>,
    #[sea_orm(belongs_to, from = "uploaded_by", to = "id", on_delete = "SetNull")]
    pub uploader: HasOne<super::teacher::Entity>,

    /// Opaque reference into external file storage.
    pub file: Option<String>,
    pub due_date: Option<Date>,
    pub total_marks: i32,

    #[sea_orm(has_many)]
    pub submissions: HasMany<super::submission::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
