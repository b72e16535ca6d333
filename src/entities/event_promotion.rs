use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;

use crate::pricing::Promotion;

/// Scale of `discount_bps`: 10_000 means the whole price is removed.
pub const DISCOUNT_SCALE: u32 = 4;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "event_promotion")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub event_id: Uuid,
    pub promotion_start_date: Date,
    pub promotion_end_date: Date,
    pub discount_bps: i32,
}

impl Model {
    /// The stored discount as a fraction removed, e.g. `2000` is `0.2000`.
    pub fn discount(&self) -> Decimal {
        Decimal::new(i64::from(self.discount_bps), DISCOUNT_SCALE)
    }

    pub fn to_promotion(&self) -> Promotion {
        Promotion {
            id: self.id,
            discount: self.discount(),
            starts_on: self.promotion_start_date,
            ends_on: self.promotion_end_date,
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::event::Entity",
        from = "Column::EventId",
        to = "super::event::Column::Id"
    )]
    Event,
}

impl Related<super::event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Event.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
