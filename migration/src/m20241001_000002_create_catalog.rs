use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Accommodation
        manager
            .create_table(
                Table::create()
                    .table(Accommodation::Table)
                    .if_not_exists()
                    .col(uuid(Accommodation::Id).primary_key())
                    .col(string_len(Accommodation::Name, 255).not_null())
                    .col(string_len(Accommodation::Location, 255).not_null())
                    .col(integer(Accommodation::StarRating).not_null())
                    .col(integer(Accommodation::TotalRooms).not_null())
                    .col(text(Accommodation::Amenities).not_null())
                    .col(string_len(Accommodation::AccommodationType, 255).not_null())
                    .col(string_len(Accommodation::ContactInfo, 255).not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(RoomType::Table)
                    .if_not_exists()
                    .col(uuid(RoomType::Id).primary_key())
                    .col(uuid(RoomType::AccommodationId).not_null())
                    .col(string_len(RoomType::Name, 255).not_null())
                    .col(big_integer(RoomType::PricePerNightCents).not_null())
                    .col(integer(RoomType::MaxOccupancy).not_null())
                    .col(boolean(RoomType::Available).not_null().default(true))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_room_type_accommodation")
                            .from(RoomType::Table, RoomType::AccommodationId)
                            .to(Accommodation::Table, Accommodation::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Events
        manager
            .create_table(
                Table::create()
                    .table(Event::Table)
                    .if_not_exists()
                    .col(uuid(Event::Id).primary_key())
                    .col(string_len(Event::Name, 255).not_null())
                    .col(string_len(Event::Venue, 255).not_null())
                    .col(text(Event::Description).not_null())
                    .col(date(Event::EventDate).not_null())
                    .col(big_integer(Event::EntryFeeCents).not_null())
                    .col(integer(Event::MaxParticipants).not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(EventPromotion::Table)
                    .if_not_exists()
                    .col(uuid(EventPromotion::Id).primary_key())
                    .col(uuid(EventPromotion::EventId).not_null())
                    .col(date(EventPromotion::PromotionStartDate).not_null())
                    .col(date(EventPromotion::PromotionEndDate).not_null())
                    .col(integer(EventPromotion::DiscountBps).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_event_promotion_event")
                            .from(EventPromotion::Table, EventPromotion::EventId)
                            .to(Event::Table, Event::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Dining
        manager
            .create_table(
                Table::create()
                    .table(Restaurant::Table)
                    .if_not_exists()
                    .col(uuid(Restaurant::Id).primary_key())
                    .col(string_len(Restaurant::Name, 255).not_null())
                    .col(string_len(Restaurant::Location, 255).not_null())
                    .col(string_len(Restaurant::CuisineType, 255).not_null())
                    .col(string_len(Restaurant::OpeningHours, 255).not_null())
                    .col(string_len(Restaurant::ContactInfo, 255).not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Menu::Table)
                    .if_not_exists()
                    .col(uuid(Menu::Id).primary_key())
                    .col(uuid(Menu::RestaurantId).not_null())
                    .col(string_len(Menu::ItemName, 255).not_null())
                    .col(text(Menu::Description).not_null())
                    .col(big_integer(Menu::PriceCents).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_menu_restaurant")
                            .from(Menu::Table, Menu::RestaurantId)
                            .to(Restaurant::Table, Restaurant::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Tours
        manager
            .create_table(
                Table::create()
                    .table(Destination::Table)
                    .if_not_exists()
                    .col(uuid(Destination::Id).primary_key())
                    .col(string_len(Destination::Name, 255).not_null())
                    .col(string_len(Destination::Category, 255).not_null())
                    .col(text(Destination::Description).not_null())
                    .col(string_len(Destination::Location, 255).not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Tour::Table)
                    .if_not_exists()
                    .col(uuid(Tour::Id).primary_key())
                    .col(uuid(Tour::DestinationId).not_null())
                    .col(string_len(Tour::Name, 255).not_null())
                    .col(string_len(Tour::TourType, 255).not_null())
                    .col(string_len(Tour::Duration, 255).not_null())
                    .col(big_integer(Tour::PricePerPersonCents).not_null())
                    .col(integer(Tour::MaxCapacity).not_null())
                    .col(date(Tour::TourDate).not_null())
                    .col(string_len(Tour::GuideName, 255).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tour_destination")
                            .from(Tour::Table, Tour::DestinationId)
                            .to(Destination::Table, Destination::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Tour::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Destination::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Menu::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Restaurant::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(EventPromotion::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Event::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(RoomType::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Accommodation::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Accommodation {
    Table,
    Id,
    Name,
    Location,
    StarRating,
    TotalRooms,
    Amenities,
    AccommodationType,
    ContactInfo,
}

#[derive(DeriveIden)]
pub enum RoomType {
    Table,
    Id,
    AccommodationId,
    Name,
    PricePerNightCents,
    MaxOccupancy,
    Available,
}

#[derive(DeriveIden)]
pub enum Event {
    Table,
    Id,
    Name,
    Venue,
    Description,
    EventDate,
    EntryFeeCents,
    MaxParticipants,
}

#[derive(DeriveIden)]
pub enum EventPromotion {
    Table,
    Id,
    EventId,
    PromotionStartDate,
    PromotionEndDate,
    DiscountBps,
}

#[derive(DeriveIden)]
pub enum Restaurant {
    Table,
    Id,
    Name,
    Location,
    CuisineType,
    OpeningHours,
    ContactInfo,
}

#[derive(DeriveIden)]
pub enum Menu {
    Table,
    Id,
    RestaurantId,
    ItemName,
    Description,
    PriceCents,
}

#[derive(DeriveIden)]
pub enum Destination {
    Table,
    Id,
    Name,
    Category,
    Description,
    Location,
}

#[derive(DeriveIden)]
pub enum Tour {
    Table,
    Id,
    DestinationId,
    Name,
    TourType,
    Duration,
    PricePerPersonCents,
    MaxCapacity,
    TourDate,
    GuideName,
}
