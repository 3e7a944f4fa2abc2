use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "message")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub sender_id: i32,
    #[sea_orm(
        belongs_to,
        relation_enum = "Sender",
        from = "sender_id",
        to = "id",
        on_delete = "Cascade"
    )]
    pub sender: HasOne<super::user::Entity>,

    pub recipient_id: i32,
    #[sea_orm(
        belongs_to,
        relation_enum = "Recipient",
        from = "recipient_id",
        to = "id",
        on_delete = "Cascade"
    )]
    pub recipient: HasOne<super::user::Entity>,

    pub subject: String,
    #[sea_orm(column_type = "Text")]
    pub body: String,
    pub sent_at: DateTimeUtc,
    pub is_read: bool,
    pub read_at: Option<DateTimeUtc>,

    pub parent_message_id: Option<i32>,
    #[sea_orm(
        self_ref,
        relation_enum = "Parent",
        from = "parent_message_id",
        to = "id",
        on_delete = "SetNull"
    )]
    pub parent: HasOne<Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
