use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Banner, Page};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateBannerRequest {
    pub page: String,
    pub image: String,
    pub title: Option<String>,
    pub link: Option<String>,
    pub active: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateBannerRequest {
    pub page: Option<String>,
    pub image: Option<String>,
    pub title: Option<String>,
    pub link: Option<String>,
    pub active: Option<bool>,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct BannerList {
    #[schema(value_type = Vec<Banner>)]
    pub items: Vec<Banner>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePageRequest {
    pub title: String,
    pub slug: Option<String>,
    pub content: String,
    pub active: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdatePageRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub active: Option<bool>,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct PageList {
    #[schema(value_type = Vec<Page>)]
    pub items: Vec<Page>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateSettingsRequest {
    pub site_name: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub address: Option<String>,
    pub facebook: Option<String>,
    pub instagram: Option<String>,
    pub twitter: Option<String>,
    pub youtube: Option<String>,
    pub logo: Option<String>,
    pub favicon: Option<String>,
}
