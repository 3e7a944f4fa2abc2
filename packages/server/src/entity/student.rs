use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Student profile extending a `user` with role `student`.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "student")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub user_id: i32,
    #[sea_orm(belongs_to, from = "user_id", to = "id", on_delete = "Cascade")]
    pub user: HasOne<super::user::Entity>,

    #[sea_orm(unique)]
    pub roll_no: String,

    pub classroom_id: Option<i32>,
    #[sea_orm(belongs_to, from = "classroom_id", to = "id", on_delete = "SetNull")]
    pub classroom: HasOne<super::classroom::Entity>,

    pub parent_name: Option<String>,
    pub parent_phone: Option<String>,
    pub admission_date: Date,
    pub is_active: bool,
}

impl ActiveModelBehavior for ActiveModel {}
