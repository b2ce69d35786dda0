use sea_orm_migration::prelude::extension::postgres::Type;
use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Email,
    Username,
    PasswordHash,
    FirstName,
    LastName,
    Phone,
    TierId,
    MembershipStatus,
    MembershipStartedAt,
    MembershipExpiresAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Memberships {
    Table,
    Id,
    UserId,
    TierId,
    Status,
    StripeSessionId,
    StripeSubscriptionId,
    Amount,
    StartedAt,
    EndsAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Listings {
    Table,
    Id,
    UserId,
    Title,
    Description,
    PropertyType,
    ResortName,
    City,
    State,
    Country,
    ZipCode,
    Bedrooms,
    Bathrooms,
    Sleeps,
    UnitSize,
    Floor,
    ViewType,
    OwnershipType,
    WeekNumber,
    Season,
    UsageType,
    SalePrice,
    RentalPriceWeekly,
    RentalPriceNightly,
    MaintenanceFee,
    AvailableDates,
    CheckInDay,
    Amenities,
    ContactMethod,
    ContactPhone,
    ContactEmail,
    Status,
    IsFeatured,
    FeaturedUntil,
    PhotoCount,
    MainPhotoUrl,
    ViewCount,
    InquiryCount,
    FavoriteCount,
    CreatedAt,
    UpdatedAt,
    LastViewed,
}

#[derive(DeriveIden)]
enum ListingPhotos {
    Table,
    Id,
    ListingId,
    Filename,
    OriginalFilename,
    FilePath,
    FileSize,
    Width,
    Height,
    Caption,
    SortOrder,
    IsMain,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Favorites {
    Table,
    Id,
    UserId,
    ListingId,
    Notes,
    CreatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // enums
        manager
            .create_type(
                Type::create()
                    .as_enum(Alias::new("property_type"))
                    .values(vec![
                        Alias::new("sale"),
                        Alias::new("rental"),
                        Alias::new("both"),
                    ])
                    .to_owned(),
            )
            .await?;
        manager
            .create_type(
                Type::create()
                    .as_enum(Alias::new("listing_status"))
                    .values(vec![
                        Alias::new("active"),
                        Alias::new("inactive"),
                        Alias::new("sold"),
                        Alias::new("rented"),
                    ])
                    .to_owned(),
            )
            .await?;
        manager
            .create_type(
                Type::create()
                    .as_enum(Alias::new("membership_status"))
                    .values(vec![
                        Alias::new("active"),
                        Alias::new("expired"),
                        Alias::new("cancelled"),
                    ])
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Email).string_len(120).not_null())
                    .col(ColumnDef::new(Users::Username).string_len(80).not_null())
                    .col(
                        ColumnDef::new(Users::PasswordHash)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Users::FirstName).string_len(50).null())
                    .col(ColumnDef::new(Users::LastName).string_len(50).null())
                    .col(ColumnDef::new(Users::Phone).string_len(20).null())
                    .col(ColumnDef::new(Users::TierId).string_len(50).null())
                    .col(
                        ColumnDef::new(Users::MembershipStatus)
                            .custom(Alias::new("membership_status"))
                            .not_null()
                            .default(Expr::cust("'active'::membership_status")),
                    )
                    .col(
                        ColumnDef::new(Users::MembershipStartedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Users::MembershipExpiresAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::cust("NOW()"))
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Users::UpdatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::cust("NOW()"))
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_users_email")
                    .table(Users::Table)
                    .col(Users::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_users_username")
                    .table(Users::Table)
                    .col(Users::Username)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Memberships::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Memberships::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Memberships::UserId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Memberships::TierId)
                            .string_len(50)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Memberships::Status)
                            .custom(Alias::new("membership_status"))
                            .not_null()
                            .default(Expr::cust("'active'::membership_status")),
                    )
                    .col(
                        ColumnDef::new(Memberships::StripeSessionId)
                            .string_len(255)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Memberships::StripeSubscriptionId)
                            .string_len(255)
                            .null(),
                    )
                    .col(ColumnDef::new(Memberships::Amount).decimal_len(10, 2).null())
                    .col(
                        ColumnDef::new(Memberships::StartedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Memberships::EndsAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Memberships::CreatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::cust("NOW()"))
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Memberships::UpdatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::cust("NOW()"))
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_memberships_user")
                            .from(Memberships::Table, Memberships::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_memberships_subscription")
                    .table(Memberships::Table)
                    .col(Memberships::StripeSubscriptionId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Listings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Listings::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Listings::UserId).big_integer().not_null())
                    .col(ColumnDef::new(Listings::Title).string_len(200).not_null())
                    .col(ColumnDef::new(Listings::Description).text().null())
                    .col(
                        ColumnDef::new(Listings::PropertyType)
                            .custom(Alias::new("property_type"))
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Listings::ResortName)
                            .string_len(200)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Listings::City).string_len(100).not_null())
                    .col(ColumnDef::new(Listings::State).string_len(50).not_null())
                    .col(ColumnDef::new(Listings::Country).string_len(50).not_null())
                    .col(ColumnDef::new(Listings::ZipCode).string_len(20).null())
                    .col(ColumnDef::new(Listings::Bedrooms).integer().null())
                    .col(ColumnDef::new(Listings::Bathrooms).decimal_len(4, 1).null())
                    .col(ColumnDef::new(Listings::Sleeps).integer().null())
                    .col(ColumnDef::new(Listings::UnitSize).string_len(50).null())
                    .col(ColumnDef::new(Listings::Floor).string_len(20).null())
                    .col(ColumnDef::new(Listings::ViewType).string_len(100).null())
                    .col(ColumnDef::new(Listings::OwnershipType).string_len(50).null())
                    .col(ColumnDef::new(Listings::WeekNumber).string_len(20).null())
                    .col(ColumnDef::new(Listings::Season).string_len(20).null())
                    .col(ColumnDef::new(Listings::UsageType).string_len(20).null())
                    .col(ColumnDef::new(Listings::SalePrice).decimal_len(10, 2).null())
                    .col(
                        ColumnDef::new(Listings::RentalPriceWeekly)
                            .decimal_len(10, 2)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Listings::RentalPriceNightly)
                            .decimal_len(10, 2)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Listings::MaintenanceFee)
                            .decimal_len(10, 2)
                            .null(),
                    )
                    .col(ColumnDef::new(Listings::AvailableDates).text().null())
                    .col(ColumnDef::new(Listings::CheckInDay).string_len(20).null())
                    .col(ColumnDef::new(Listings::Amenities).text().null())
                    .col(
                        ColumnDef::new(Listings::ContactMethod)
                            .string_len(20)
                            .null(),
                    )
                    .col(ColumnDef::new(Listings::ContactPhone).string_len(20).null())
                    .col(ColumnDef::new(Listings::ContactEmail).string_len(120).null())
                    .col(
                        ColumnDef::new(Listings::Status)
                            .custom(Alias::new("listing_status"))
                            .not_null()
                            .default(Expr::cust("'active'::listing_status")),
                    )
                    .col(
                        ColumnDef::new(Listings::IsFeatured)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Listings::FeaturedUntil)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Listings::PhotoCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Listings::MainPhotoUrl).string_len(500).null())
                    .col(
                        ColumnDef::new(Listings::ViewCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Listings::InquiryCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Listings::FavoriteCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Listings::CreatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::cust("NOW()"))
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Listings::UpdatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::cust("NOW()"))
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Listings::LastViewed)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_listings_user")
                            .from(Listings::Table, Listings::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_listings_status")
                    .table(Listings::Table)
                    .col(Listings::Status)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_listings_user")
                    .table(Listings::Table)
                    .col(Listings::UserId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_listings_featured_created")
                    .table(Listings::Table)
                    .col(Listings::IsFeatured)
                    .col(Listings::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ListingPhotos::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ListingPhotos::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ListingPhotos::ListingId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ListingPhotos::Filename)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ListingPhotos::OriginalFilename)
                            .string_len(255)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ListingPhotos::FilePath)
                            .string_len(500)
                            .not_null(),
                    )
                    .col(ColumnDef::new(ListingPhotos::FileSize).big_integer().null())
                    .col(ColumnDef::new(ListingPhotos::Width).integer().null())
                    .col(ColumnDef::new(ListingPhotos::Height).integer().null())
                    .col(ColumnDef::new(ListingPhotos::Caption).string_len(255).null())
                    .col(
                        ColumnDef::new(ListingPhotos::SortOrder)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ListingPhotos::IsMain)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(ListingPhotos::CreatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::cust("NOW()"))
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_listing_photos_listing")
                            .from(ListingPhotos::Table, ListingPhotos::ListingId)
                            .to(Listings::Table, Listings::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_listing_photos_listing")
                    .table(ListingPhotos::Table)
                    .col(ListingPhotos::ListingId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Favorites::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Favorites::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Favorites::UserId).big_integer().not_null())
                    .col(ColumnDef::new(Favorites::ListingId).big_integer().not_null())
                    .col(ColumnDef::new(Favorites::Notes).text().null())
                    .col(
                        ColumnDef::new(Favorites::CreatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::cust("NOW()"))
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_favorites_user")
                            .from(Favorites::Table, Favorites::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_favorites_listing")
                            .from(Favorites::Table, Favorites::ListingId)
                            .to(Listings::Table, Listings::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;
        // one favorite per (user, listing); backs the strict conflict check
        manager
            .create_index(
                Index::create()
                    .name("uq_favorites_user_listing")
                    .table(Favorites::Table)
                    .col(Favorites::UserId)
                    .col(Favorites::ListingId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Favorites::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ListingPhotos::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Listings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Memberships::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        manager
            .drop_type(Type::drop().name(Alias::new("membership_status")).to_owned())
            .await?;
        manager
            .drop_type(Type::drop().name(Alias::new("listing_status")).to_owned())
            .await?;
        manager
            .drop_type(Type::drop().name(Alias::new("property_type")).to_owned())
            .await?;
        Ok(())
    }
}
