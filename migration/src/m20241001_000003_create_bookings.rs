use sea_orm_migration::{prelude::*, schema::*};

use super::m20241001_000001_create_users::User;
use super::m20241001_000002_create_catalog::{
    Accommodation, Event, EventPromotion, Menu, Restaurant, RoomType, Tour,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(RoomBooking::Table)
                    .if_not_exists()
                    .col(uuid(RoomBooking::Id).primary_key())
                    .col(uuid(RoomBooking::RoomTypeId).not_null())
                    .col(uuid(RoomBooking::AccommodationId).not_null())
                    .col(uuid(RoomBooking::UserId).not_null())
                    .col(date(RoomBooking::CheckInDate).not_null())
                    .col(date(RoomBooking::CheckOutDate).not_null())
                    .col(big_integer(RoomBooking::TotalPriceCents).not_null())
                    .col(boolean(RoomBooking::BookingStatus).not_null().default(false))
                    .col(boolean(RoomBooking::PaymentStatus).not_null().default(false))
                    .col(
                        timestamp_with_time_zone(RoomBooking::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_room_booking_room_type")
                            .from(RoomBooking::Table, RoomBooking::RoomTypeId)
                            .to(RoomType::Table, RoomType::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_room_booking_accommodation")
                            .from(RoomBooking::Table, RoomBooking::AccommodationId)
                            .to(Accommodation::Table, Accommodation::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_room_booking_user")
                            .from(RoomBooking::Table, RoomBooking::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(VenueBooking::Table)
                    .if_not_exists()
                    .col(uuid(VenueBooking::Id).primary_key())
                    .col(uuid(VenueBooking::EventId).not_null())
                    .col(uuid(VenueBooking::UserId).not_null())
                    .col(uuid_null(VenueBooking::PromotionId))
                    .col(timestamp_with_time_zone(VenueBooking::BookingDate).not_null())
                    .col(integer(VenueBooking::NumberOfTickets).not_null())
                    .col(big_integer(VenueBooking::BaseAmountCents).not_null())
                    .col(big_integer(VenueBooking::DiscountAmountCents).not_null())
                    .col(big_integer(VenueBooking::TotalAmountCents).not_null())
                    .col(boolean(VenueBooking::BookingStatus).not_null().default(false))
                    .col(boolean(VenueBooking::PaymentStatus).not_null().default(false))
                    .col(
                        timestamp_with_time_zone(VenueBooking::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_venue_booking_event")
                            .from(VenueBooking::Table, VenueBooking::EventId)
                            .to(Event::Table, Event::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_venue_booking_user")
                            .from(VenueBooking::Table, VenueBooking::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_venue_booking_promotion")
                            .from(VenueBooking::Table, VenueBooking::PromotionId)
                            .to(EventPromotion::Table, EventPromotion::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(OnlineOrder::Table)
                    .if_not_exists()
                    .col(uuid(OnlineOrder::Id).primary_key())
                    .col(uuid(OnlineOrder::UserId).not_null())
                    .col(uuid(OnlineOrder::RestaurantId).not_null())
                    .col(string_len(OnlineOrder::OrderStatus, 255).not_null())
                    .col(big_integer(OnlineOrder::TotalAmountCents).not_null())
                    .col(
                        timestamp_with_time_zone(OnlineOrder::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_online_order_user")
                            .from(OnlineOrder::Table, OnlineOrder::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_online_order_restaurant")
                            .from(OnlineOrder::Table, OnlineOrder::RestaurantId)
                            .to(Restaurant::Table, Restaurant::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(OrderItem::Table)
                    .if_not_exists()
                    .col(uuid(OrderItem::Id).primary_key())
                    .col(uuid(OrderItem::OrderId).not_null())
                    .col(uuid(OrderItem::MenuItemId).not_null())
                    .col(integer(OrderItem::Quantity).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_order_item_order")
                            .from(OrderItem::Table, OrderItem::OrderId)
                            .to(OnlineOrder::Table, OnlineOrder::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_order_item_menu")
                            .from(OrderItem::Table, OrderItem::MenuItemId)
                            .to(Menu::Table, Menu::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TourBooking::Table)
                    .if_not_exists()
                    .col(uuid(TourBooking::Id).primary_key())
                    .col(uuid(TourBooking::TourId).not_null())
                    .col(uuid(TourBooking::UserId).not_null())
                    .col(integer(TourBooking::Persons).not_null())
                    .col(big_integer(TourBooking::TotalPriceCents).not_null())
                    .col(boolean(TourBooking::BookingStatus).not_null().default(false))
                    .col(boolean(TourBooking::PaymentStatus).not_null().default(false))
                    .col(
                        timestamp_with_time_zone(TourBooking::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tour_booking_tour")
                            .from(TourBooking::Table, TourBooking::TourId)
                            .to(Tour::Table, Tour::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tour_booking_user")
                            .from(TourBooking::Table, TourBooking::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TourBooking::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(OrderItem::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(OnlineOrder::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(VenueBooking::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(RoomBooking::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum RoomBooking {
    Table,
    Id,
    RoomTypeId,
    AccommodationId,
    UserId,
    CheckInDate,
    CheckOutDate,
    TotalPriceCents,
    BookingStatus,
    PaymentStatus,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum VenueBooking {
    Table,
    Id,
    EventId,
    UserId,
    PromotionId,
    BookingDate,
    NumberOfTickets,
    BaseAmountCents,
    DiscountAmountCents,
    TotalAmountCents,
    BookingStatus,
    PaymentStatus,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum OnlineOrder {
    Table,
    Id,
    UserId,
    RestaurantId,
    OrderStatus,
    TotalAmountCents,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum OrderItem {
    Table,
    Id,
    OrderId,
    MenuItemId,
    Quantity,
}

#[derive(DeriveIden)]
pub enum TourBooking {
    Table,
    Id,
    TourId,
    UserId,
    Persons,
    TotalPriceCents,
    BookingStatus,
    PaymentStatus,
    CreatedAt,
}
