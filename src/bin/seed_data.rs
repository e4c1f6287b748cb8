//! Seeds a development database with an admin manager, a default
//! category, and a few demo products with stocked inventory.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use pos_api as api;
use pos_api::entities::{category, inventory, product, user};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = api::config::load_config()?;
    api::config::init_tracing(cfg.log_level(), cfg.log_json);

    let db = Arc::new(api::db::establish_connection_from_app_config(&cfg).await?);
    api::db::run_migrations(&db).await?;

    let now = Utc::now();

    // Admin manager account
    let admin_email =
        std::env::var("SEED_ADMIN_EMAIL").unwrap_or_else(|_| "admin@example.com".to_string());
    let admin_password =
        std::env::var("SEED_ADMIN_PASS").unwrap_or_else(|_| "password123".to_string());

    let admin = match user::Entity::find()
        .filter(user::Column::Email.eq(admin_email.clone()))
        .one(&*db)
        .await?
    {
        Some(existing) => existing,
        None => {
            user::ActiveModel {
                id: Set(Uuid::new_v4()),
                email: Set(admin_email.clone()),
                password_hash: Set(api::auth::hash_password(&admin_password)?),
                name: Set("Admin".to_string()),
                role: Set(user::UserRole::Manager),
                created_at: Set(now),
                updated_at: Set(Some(now)),
            }
            .insert(&*db)
            .await?
        }
    };
    info!(user_id = %admin.id, email = %admin.email, "seeded admin user");

    // Default category
    let general = match category::Entity::find()
        .filter(category::Column::Name.eq("General"))
        .one(&*db)
        .await?
    {
        Some(existing) => existing,
        None => {
            category::ActiveModel {
                id: Set(Uuid::new_v4()),
                name: Set("General".to_string()),
                description: Set(Some("Default product category".to_string())),
                created_at: Set(now),
                updated_at: Set(Some(now)),
            }
            .insert(&*db)
            .await?
        }
    };

    // Demo products with stock
    let demo_products: [(&str, &str, i64, &str, i32); 3] = [
        ("Plain Coffee", "Freshly brewed black coffee", 250, "COF-0001", 50),
        ("Blueberry Muffin", "House baked muffin with blueberries", 350, "MUF-0001", 20),
        ("Bottled Water", "500ml spring water", 150, "WTR-0001", 100),
    ];

    for (name, description, price_cents, barcode, stock) in demo_products {
        let existing = product::Entity::find()
            .filter(product::Column::Barcode.eq(barcode))
            .one(&*db)
            .await?;
        if existing.is_some() {
            continue;
        }

        let product_id = Uuid::new_v4();
        product::ActiveModel {
            id: Set(product_id),
            name: Set(name.to_string()),
            description: Set(Some(description.to_string())),
            price_cents: Set(price_cents),
            barcode: Set(Some(barcode.to_string())),
            image_url: Set(None),
            category_id: Set(general.id),
            created_at: Set(now),
            updated_at: Set(Some(now)),
        }
        .insert(&*db)
        .await?;

        inventory::ActiveModel {
            product_id: Set(product_id),
            quantity: Set(stock),
            min_stock: Set(5),
            updated_at: Set(Some(now)),
        }
        .insert(&*db)
        .await?;

        info!(product = name, price_cents, stock, "seeded product");
    }

    info!("seed complete");
    Ok(())
}
