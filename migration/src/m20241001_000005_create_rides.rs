use sea_orm_migration::{prelude::*, schema::*};

use super::m20241001_000001_create_users::User;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TransportationProvider::Table)
                    .if_not_exists()
                    .col(uuid(TransportationProvider::Id).primary_key())
                    .col(string_len(TransportationProvider::Name, 255).not_null())
                    .col(string_len(TransportationProvider::ServiceType, 255).not_null())
                    .col(big_integer(TransportationProvider::BaseFareCents).not_null())
                    .col(big_integer(TransportationProvider::PricePerKmCents).not_null())
                    .col(string_len(TransportationProvider::ContactInfo, 255).not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(RideBooking::Table)
                    .if_not_exists()
                    .col(uuid(RideBooking::Id).primary_key())
                    .col(uuid(RideBooking::ProviderId).not_null())
                    .col(uuid(RideBooking::UserId).not_null())
                    .col(string_len(RideBooking::PickupLocation, 255).not_null())
                    .col(string_len(RideBooking::DropOffLocation, 255).not_null())
                    .col(date(RideBooking::RideDate).not_null())
                    .col(time(RideBooking::PickupTime).not_null())
                    .col(integer(RideBooking::DistanceM).not_null())
                    .col(big_integer(RideBooking::EstimatedFareCents).not_null())
                    .col(boolean(RideBooking::BookingStatus).not_null().default(false))
                    .col(boolean(RideBooking::PaymentStatus).not_null().default(false))
                    .col(
                        timestamp_with_time_zone(RideBooking::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ride_booking_provider")
                            .from(RideBooking::Table, RideBooking::ProviderId)
                            .to(TransportationProvider::Table, TransportationProvider::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ride_booking_user")
                            .from(RideBooking::Table, RideBooking::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RideBooking::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TransportationProvider::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum TransportationProvider {
    Table,
    Id,
    Name,
    ServiceType,
    BaseFareCents,
    PricePerKmCents,
    ContactInfo,
}

#[derive(DeriveIden)]
pub enum RideBooking {
    Table,
    Id,
    ProviderId,
    UserId,
    PickupLocation,
    DropOffLocation,
    RideDate,
    PickupTime,
    DistanceM,
    EstimatedFareCents,
    BookingStatus,
    PaymentStatus,
    CreatedAt,
}
