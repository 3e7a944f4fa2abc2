use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A class section. `(name, section)` is unique; see `seed::ensure_indexes`.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "classroom")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,
    pub section: Option<String>,

    pub class_teacher_id: Option<i32>,
    #[sea_orm(belongs_to, from = "class_teacher_id", to = "id", on_delete = "SetNull")]
    pub class_teacher: HasOne<super::teacher::Entity>,

    #[sea_orm(has_many)]
    pub students: HasMany<super::student::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
