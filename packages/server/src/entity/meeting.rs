use common::{MeetingStatus, MeetingType};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "meeting")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub title: String,
    pub meeting_type: MeetingType,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub topic: String,
    pub meeting_date: Date,
    pub start_time: Time,
    pub end_time: Time,
    pub location: String,

    pub organized_by: i32,
    #[sea_orm(belongs_to, from = "organized_by", to = "id", on_delete = "Cascade")]
    pub organizer: HasOne<super::user::Entity>,

    pub status: MeetingStatus,
    pub is_virtual: bool,
    pub meeting_link: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub meeting_notes: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub action_items: Option<String>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
