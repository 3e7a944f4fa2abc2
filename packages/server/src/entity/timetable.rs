use common::Weekday;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "timetable")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique_key = "classroom_slot")]
    pub classroom_id: i32,
    #[sea_orm(belongs_to, from = "classroom_id", to = "id", on_delete = "Cascade")]
    pub classroom: HasOne<super::classroom::Entity>,

    pub subject_id: i32,
    #[sea_orm(belongs_to, from = "subject_id", to = "id", on_delete = "Cascade")]
    pub subject: HasOne<super::subject::Entity>,

    pub teacher_id: Option<i32>,
    #[sea_orm(belongs_to, from = "teacher_id", to = "id", on_delete = "SetNull")]
    pub teacher: HasOne<super::teacher::Entity>,

    #[sea_orm(unique_key = "classroom_slot")]
    pub weekday: Weekday,
    #[sea_orm(unique_key = "classroom_slot")]
    pub start_time: Time,
    pub end_time: Time,
    pub room_number: Option<String>,
}

impl ActiveModelBehavior for ActiveModel {}
