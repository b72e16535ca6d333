use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub name: String,
    pub is_staff: bool,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::auth_token::Entity")]
    AuthTokens,
    #[sea_orm(has_many = "super::room_booking::Entity")]
    RoomBookings,
    #[sea_orm(has_many = "super::venue_booking::Entity")]
    VenueBookings,
    #[sea_orm(has_many = "super::online_order::Entity")]
    OnlineOrders,
    #[sea_orm(has_many = "super::tour_booking::Entity")]
    TourBookings,
}

impl Related<super::auth_token::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AuthTokens.def()
    }
}

impl Related<super::room_booking::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RoomBookings.def()
    }
}

impl Related<super::venue_booking::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VenueBookings.def()
    }
}

impl Related<super::online_order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OnlineOrders.def()
    }
}

impl Related<super::tour_booking::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TourBookings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
