use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "event")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub venue: String,
    pub description: String,
    pub event_date: Date,
    pub entry_fee_cents: i64,
    pub max_participants: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::event_promotion::Entity")]
    Promotions,
    #[sea_orm(has_many = "super::venue_booking::Entity")]
    VenueBookings,
}

impl Related<super::event_promotion::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Promotions.def()
    }
}

impl Related<super::venue_booking::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VenueBookings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
