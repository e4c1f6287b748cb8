use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Receipts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Receipts::Id).uuid().primary_key().not_null())
                    .col(ColumnDef::new(Receipts::OrderId).uuid().not_null())
                    .col(ColumnDef::new(Receipts::Body).text().not_null())
                    .col(
                        ColumnDef::new(Receipts::EmailSent)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Receipts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_receipts_order_id")
                            .from(Receipts::Table, Receipts::OrderId)
                            .to(
                                super::m20240701_000005_create_orders_table::Orders::Table,
                                super::m20240701_000005_create_orders_table::Orders::Id,
                            )
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_receipts_order_id")
                    .table(Receipts::Table)
                    .col(Receipts::OrderId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Receipts::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Receipts {
    Table,
    Id,
    OrderId,
    Body,
    EmailSent,
    CreatedAt,
}
