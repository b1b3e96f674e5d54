use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Brand, Category, Product, Subcategory, Variation};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCategoryRequest {
    pub name: String,
    pub slug: Option<String>,
    pub image: Option<String>,
    pub active: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub image: Option<String>,
    pub active: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryWithSubcategories {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub image: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub subcategories: Vec<Subcategory>,
}

impl CategoryWithSubcategories {
    pub fn new(category: Category, subcategories: Vec<Subcategory>) -> Self {
        Self {
            id: category.id,
            name: category.name,
            slug: category.slug,
            image: category.image,
            active: category.active,
            created_at: category.created_at,
            subcategories,
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct CategoryList {
    #[schema(value_type = Vec<CategoryWithSubcategories>)]
    pub items: Vec<CategoryWithSubcategories>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateSubcategoryRequest {
    pub category_id: Uuid,
    pub name: String,
    pub slug: Option<String>,
    pub active: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateSubcategoryRequest {
    pub name: Option<String>,
    pub active: Option<bool>,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct SubcategoryList {
    #[schema(value_type = Vec<Subcategory>)]
    pub items: Vec<Subcategory>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateBrandRequest {
    pub name: String,
    pub slug: Option<String>,
    pub logo: Option<String>,
    pub active: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateBrandRequest {
    pub name: Option<String>,
    pub logo: Option<String>,
    pub active: Option<bool>,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct BrandList {
    #[schema(value_type = Vec<Brand>)]
    pub items: Vec<Brand>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct VariationInput {
    pub color: String,
    pub size: String,
    pub price: Decimal,
    pub stock: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub name: String,
    pub slug: Option<String>,
    pub description: String,
    pub price: Decimal,
    pub discount_price: Option<Decimal>,
    pub discount_percent: Option<i32>,
    pub stock: i32,
    pub category_id: Uuid,
    pub subcategory_id: Option<Uuid>,
    pub brand_id: Option<Uuid>,
    pub images: Option<Vec<String>>,
    pub video: Option<String>,
    pub featured: Option<bool>,
    pub trending: Option<bool>,
    pub active: Option<bool>,
    pub variations: Option<Vec<VariationInput>>,
}

/// Partial update; `variations`, when present, replaces the full set.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub discount_price: Option<Decimal>,
    pub discount_percent: Option<i32>,
    pub stock: Option<i32>,
    pub category_id: Option<Uuid>,
    pub subcategory_id: Option<Uuid>,
    pub brand_id: Option<Uuid>,
    pub images: Option<Vec<String>>,
    pub video: Option<String>,
    pub featured: Option<bool>,
    pub trending: Option<bool>,
    pub active: Option<bool>,
    pub variations: Option<Vec<VariationInput>>,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct ProductList {
    #[schema(value_type = Vec<Product>)]
    pub items: Vec<Product>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductDetail {
    pub product: Product,
    pub variations: Vec<Variation>,
}
