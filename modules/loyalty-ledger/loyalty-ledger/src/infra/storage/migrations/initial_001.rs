use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Customers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Customers::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Customers::Name).string().not_null())
                    .col(ColumnDef::new(Customers::Phone).string().not_null())
                    .col(
                        ColumnDef::new(Customers::TotalPoints)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Customers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_customers_phone")
                    .table(Customers::Table)
                    .col(Customers::Phone)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Merchants::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Merchants::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Merchants::Name).string().not_null())
                    .col(ColumnDef::new(Merchants::ShopName).string().not_null())
                    .col(ColumnDef::new(Merchants::Phone).string().not_null())
                    .col(ColumnDef::new(Merchants::Category).string().not_null())
                    .col(ColumnDef::new(Merchants::Address).string().not_null())
                    .col(ColumnDef::new(Merchants::PointsRate).string().not_null())
                    .col(
                        ColumnDef::new(Merchants::WalletBalance)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Merchants::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Merchants::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PointsTransactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PointsTransactions::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PointsTransactions::MerchantId).uuid().not_null())
                    .col(ColumnDef::new(PointsTransactions::CustomerId).uuid().not_null())
                    .col(ColumnDef::new(PointsTransactions::Amount).string().not_null())
                    .col(
                        ColumnDef::new(PointsTransactions::PointsEarned)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PointsTransactions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_points_transactions_merchant")
                            .from(PointsTransactions::Table, PointsTransactions::MerchantId)
                            .to(Merchants::Table, Merchants::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_points_transactions_customer")
                            .from(PointsTransactions::Table, PointsTransactions::CustomerId)
                            .to(Customers::Table, Customers::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Redemptions::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Redemptions::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Redemptions::MerchantId).uuid().not_null())
                    .col(ColumnDef::new(Redemptions::CustomerId).uuid().not_null())
                    .col(ColumnDef::new(Redemptions::PointsUsed).big_integer().not_null())
                    .col(ColumnDef::new(Redemptions::Discount).big_integer().not_null())
                    .col(
                        ColumnDef::new(Redemptions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_redemptions_merchant")
                            .from(Redemptions::Table, Redemptions::MerchantId)
                            .to(Merchants::Table, Merchants::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_redemptions_customer")
                            .from(Redemptions::Table, Redemptions::CustomerId)
                            .to(Customers::Table, Customers::Id),
                    )
                    .to_owned(),
            )
            .await?;

        for (name, table, column) in [
            (
                "idx_points_transactions_customer",
                PointsTransactions::Table,
                PointsTransactions::CustomerId,
            ),
            (
                "idx_points_transactions_merchant",
                PointsTransactions::Table,
                PointsTransactions::MerchantId,
            ),
        ] {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(table)
                        .col(column)
                        .if_not_exists()
                        .to_owned(),
                )
                .await?;
        }

        for (name, table, column) in [
            (
                "idx_redemptions_customer",
                Redemptions::Table,
                Redemptions::CustomerId,
            ),
            (
                "idx_redemptions_merchant",
                Redemptions::Table,
                Redemptions::MerchantId,
            ),
        ] {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(table)
                        .col(column)
                        .if_not_exists()
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Redemptions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PointsTransactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Merchants::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Customers::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Customers {
    Table,
    Id,
    Name,
    Phone,
    TotalPoints,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Merchants {
    Table,
    Id,
    Name,
    ShopName,
    Phone,
    Category,
    Address,
    PointsRate,
    WalletBalance,
    IsActive,
    CreatedAt,
}

#[derive(DeriveIden)]
enum PointsTransactions {
    Table,
    Id,
    MerchantId,
    CustomerId,
    Amount,
    PointsEarned,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Redemptions {
    Table,
    Id,
    MerchantId,
    CustomerId,
    PointsUsed,
    Discount,
    CreatedAt,
}
