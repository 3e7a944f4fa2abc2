use common::{Audience, EventType};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "event")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub event_type: EventType,
    pub start_date: Date,
    pub end_date: Date,
    pub start_time: Option<Time>,
    pub location: String,

    pub organized_by: Option<i32>,
    #[sea_orm(belongs_to, from = "organized_by", to = "id", on_delete = "SetNull")]
    pub organizer: HasOne<super::user::Entity>,

    pub target_audience: Audience,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
