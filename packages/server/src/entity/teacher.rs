use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Teacher profile extending a `user` with role `teacher`.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "teacher")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub user_id: i32,
    #[sea_orm(belongs_to, from = "user_id", to = "id", on_delete = "Cascade")]
    pub user: HasOne<super::user::Entity>,

    pub qualification: Option<String>,
    pub experience_years: i32,
    pub joining_date: Date,
    pub is_active: bool,

    #[sea_orm(has_many, via = "teacher_subject")]
    pub subjects: HasMany<super::subject::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
