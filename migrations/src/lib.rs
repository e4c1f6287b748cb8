pub use sea_orm_migration::prelude::*;

mod m20240701_000001_create_users_table;
mod m20240701_000002_create_categories_table;
mod m20240701_000003_create_products_table;
mod m20240701_000004_create_inventory_table;
mod m20240701_000005_create_orders_table;
mod m20240701_000006_create_order_items_table;
mod m20240701_000007_create_receipts_table;
mod m20240701_000008_add_order_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240701_000001_create_users_table::Migration),
            Box::new(m20240701_000002_create_categories_table::Migration),
            Box::new(m20240701_000003_create_products_table::Migration),
            Box::new(m20240701_000004_create_inventory_table::Migration),
            Box::new(m20240701_000005_create_orders_table::Migration),
            Box::new(m20240701_000006_create_order_items_table::Migration),
            Box::new(m20240701_000007_create_receipts_table::Migration),
            Box::new(m20240701_000008_add_order_indexes::Migration),
        ]
    }
}
