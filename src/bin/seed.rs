use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};
use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use storefront_api::{config::AppConfig, db::create_pool};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    sqlx::migrate!("./migrations").run(&pool).await?;

    let admin_id = ensure_admin(&pool, "admin@example.com", "admin123").await?;
    let user_id = ensure_user(&pool, "user@example.com", "user123").await?;
    seed_catalog(&pool).await?;
    seed_coupon(&pool).await?;
    seed_settings(&pool).await?;
    seed_pages(&pool).await?;
    seed_banner(&pool).await?;

    println!("Seed completed. Admin ID: {admin_id}, User ID: {user_id}");
    Ok(())
}

async fn ensure_admin(pool: &sqlx::PgPool, email: &str, password: &str) -> anyhow::Result<Uuid> {
    ensure_user_with_role(pool, email, password, "admin").await
}

async fn ensure_user(pool: &sqlx::PgPool, email: &str, password: &str) -> anyhow::Result<Uuid> {
    ensure_user_with_role(pool, email, password, "user").await
}

async fn ensure_user_with_role(
    pool: &sqlx::PgPool,
    email: &str,
    password: &str,
    role: &str,
) -> anyhow::Result<Uuid> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();

    let row: Option<(Uuid,)> = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, password_hash, name, role)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(password_hash)
    .bind(email.split('@').next().unwrap_or("user"))
    .bind(role)
    .fetch_optional(pool)
    .await?;

    // If user already exists, fetch id
    let user_id = match row {
        Some((id,)) => id,
        None => {
            let existing: (Uuid,) = sqlx::query_as("SELECT id FROM users WHERE email = $1")
                .bind(email)
                .fetch_one(pool)
                .await?;
            existing.0
        }
    };

    println!("Ensured user {email} (role={role})");
    Ok(user_id)
}

async fn ensure_category(pool: &sqlx::PgPool, name: &str, slug: &str) -> anyhow::Result<Uuid> {
    sqlx::query(
        r#"
        INSERT INTO categories (id, name, slug)
        VALUES ($1, $2, $3)
        ON CONFLICT (slug) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(slug)
    .execute(pool)
    .await?;

    let (id,): (Uuid,) = sqlx::query_as("SELECT id FROM categories WHERE slug = $1")
        .bind(slug)
        .fetch_one(pool)
        .await?;
    Ok(id)
}

async fn ensure_brand(pool: &sqlx::PgPool, name: &str, slug: &str) -> anyhow::Result<Uuid> {
    sqlx::query(
        r#"
        INSERT INTO brands (id, name, slug)
        VALUES ($1, $2, $3)
        ON CONFLICT (slug) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(slug)
    .execute(pool)
    .await?;

    let (id,): (Uuid,) = sqlx::query_as("SELECT id FROM brands WHERE slug = $1")
        .bind(slug)
        .fetch_one(pool)
        .await?;
    Ok(id)
}

struct DemoProduct {
    name: &'static str,
    slug: &'static str,
    description: &'static str,
    price: Decimal,
    discount_price: Option<Decimal>,
    stock: i32,
    featured: bool,
    trending: bool,
}

async fn seed_catalog(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let electronics = ensure_category(pool, "Electronics", "electronics").await?;
    let fashion = ensure_category(pool, "Fashion", "fashion").await?;
    let home = ensure_category(pool, "Home & Kitchen", "home-kitchen").await?;

    sqlx::query(
        r#"
        INSERT INTO subcategories (id, category_id, name, slug)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (slug) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(electronics)
    .bind("Audio")
    .bind("audio")
    .execute(pool)
    .await?;

    let acme = ensure_brand(pool, "Acme", "acme").await?;
    let northwind = ensure_brand(pool, "Northwind", "northwind").await?;

    let products = vec![
        (
            DemoProduct {
                name: "Wireless Earbuds",
                slug: "wireless-earbuds",
                description: "In-ear buds with 24h battery",
                price: Decimal::new(2_499_00, 2),
                discount_price: Some(Decimal::new(1_999_00, 2)),
                stock: 120,
                featured: true,
                trending: false,
            },
            electronics,
            acme,
        ),
        (
            DemoProduct {
                name: "Cotton T-Shirt",
                slug: "cotton-t-shirt",
                description: "Plain crew-neck tee",
                price: Decimal::new(599_00, 2),
                discount_price: None,
                stock: 200,
                featured: false,
                trending: true,
            },
            fashion,
            northwind,
        ),
        (
            DemoProduct {
                name: "Steel Water Bottle",
                slug: "steel-water-bottle",
                description: "1L insulated bottle",
                price: Decimal::new(899_00, 2),
                discount_price: None,
                stock: 80,
                featured: false,
                trending: false,
            },
            home,
            acme,
        ),
        (
            DemoProduct {
                name: "Bluetooth Speaker",
                slug: "bluetooth-speaker",
                description: "Portable speaker with deep bass",
                price: Decimal::new(3_499_00, 2),
                discount_price: None,
                stock: 45,
                featured: true,
                trending: true,
            },
            electronics,
            acme,
        ),
    ];

    for (product, category_id, brand_id) in products {
        sqlx::query(
            r#"
            INSERT INTO products
                (id, name, slug, description, price, discount_price, stock,
                 category_id, brand_id, featured, trending)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (slug) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(product.name)
        .bind(product.slug)
        .bind(product.description)
        .bind(product.price)
        .bind(product.discount_price)
        .bind(product.stock)
        .bind(category_id)
        .bind(brand_id)
        .bind(product.featured)
        .bind(product.trending)
        .execute(pool)
        .await?;
    }

    let (tshirt_id,): (Uuid,) = sqlx::query_as("SELECT id FROM products WHERE slug = $1")
        .bind("cotton-t-shirt")
        .fetch_one(pool)
        .await?;

    let variations = vec![
        ("Black", "M", Decimal::new(599_00, 2), 60),
        ("Black", "L", Decimal::new(599_00, 2), 50),
        ("White", "M", Decimal::new(549_00, 2), 90),
    ];
    for (color, size, price, stock) in variations {
        sqlx::query(
            r#"
            INSERT INTO variations (id, product_id, color, size, price, stock)
            SELECT $1, $2, $3, $4, $5, $6
            WHERE NOT EXISTS (
                SELECT 1 FROM variations WHERE product_id = $2 AND color = $3 AND size = $4
            )
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(tshirt_id)
        .bind(color)
        .bind(size)
        .bind(price)
        .bind(stock)
        .execute(pool)
        .await?;
    }

    println!("Seeded catalog");
    Ok(())
}

async fn seed_coupon(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let expires_at = Utc
        .with_ymd_and_hms(2027, 1, 1, 0, 0, 0)
        .single()
        .ok_or_else(|| anyhow::anyhow!("invalid expiry timestamp"))?;

    sqlx::query(
        r#"
        INSERT INTO coupons (id, code, kind, value, expires_at, usage_limit)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (code) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind("WELCOME10")
    .bind("percentage")
    .bind(Decimal::from(10))
    .bind(expires_at)
    .bind(1000_i32)
    .execute(pool)
    .await?;

    println!("Seeded coupon WELCOME10");
    Ok(())
}

async fn seed_settings(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    // Settings is a singleton row keyed by the nil uuid.
    sqlx::query(
        r#"
        INSERT INTO settings (id, site_name, contact_email)
        VALUES ($1, $2, $3)
        ON CONFLICT (id) DO NOTHING
        "#,
    )
    .bind(Uuid::nil())
    .bind("Storefront")
    .bind("support@example.com")
    .execute(pool)
    .await?;

    println!("Seeded settings");
    Ok(())
}

async fn seed_pages(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let pages = vec![
        ("About Us", "about-us", "We ship quality goods since 2020."),
        (
            "Privacy Policy",
            "privacy-policy",
            "We only store what the shop needs to fulfil your order.",
        ),
    ];

    for (title, slug, content) in pages {
        sqlx::query(
            r#"
            INSERT INTO pages (id, title, slug, content)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (slug) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(title)
        .bind(slug)
        .bind(content)
        .execute(pool)
        .await?;
    }

    println!("Seeded pages");
    Ok(())
}

async fn seed_banner(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    // Banners have no natural key; guard on placement + image instead.
    sqlx::query(
        r#"
        INSERT INTO banners (id, page, image, title, link)
        SELECT $1, $2, $3, $4, $5
        WHERE NOT EXISTS (SELECT 1 FROM banners WHERE page = $2 AND image = $3)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind("home")
    .bind("/banners/home-hero.jpg")
    .bind("Season sale")
    .bind("/products?sort=price_low")
    .execute(pool)
    .await?;

    println!("Seeded banner");
    Ok(())
}
