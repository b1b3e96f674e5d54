use rust_decimal::Decimal;
use sea_orm::{ConnectionTrait, EntityTrait, QuerySelect};
use sea_orm::sea_query::LockType;

use crate::{
    dto::cart::{CartItemInput, CartQuote, QuoteRequest, QuotedLine},
    dto::coupons::CouponSummary,
    entity::{
        products::{Entity as Products, Model as ProductModel},
        variations::{Entity as Variations, Model as VariationModel},
    },
    error::{AppError, AppResult},
    pricing::{self, PricingLine},
    response::{ApiResponse, Meta},
    services::coupon_service,
    state::AppState,
};

/// A cart line resolved against the catalog: the authoritative unit price,
/// the rows backing it, and the selection details for the order item.
#[derive(Debug, Clone)]
pub struct ResolvedLine {
    pub product: ProductModel,
    pub variation: Option<VariationModel>,
    pub quantity: i32,
    pub color: Option<String>,
    pub size: Option<String>,
    pub unit_price: Decimal,
}

impl ResolvedLine {
    pub fn pricing_line(&self) -> PricingLine {
        PricingLine {
            product_id: self.product.id,
            category_id: Some(self.product.category_id),
            unit_price: self.unit_price,
            quantity: self.quantity,
        }
    }

    pub fn available_stock(&self) -> i32 {
        match &self.variation {
            Some(variation) => variation.stock,
            None => self.product.stock,
        }
    }

    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Resolves client cart items to catalog rows and server-side prices. With
/// `lock` the rows are read `FOR UPDATE`, in product-id order, so callers can
/// decrement stock inside the same transaction.
pub async fn resolve_lines<C>(
    conn: &C,
    items: &[CartItemInput],
    lock: bool,
) -> AppResult<Vec<ResolvedLine>>
where
    C: ConnectionTrait,
{
    if items.is_empty() {
        return Err(AppError::BadRequest("Cart is empty".into()));
    }

    let mut ordered: Vec<&CartItemInput> = items.iter().collect();
    ordered.sort_by_key(|item| item.product_id);

    let mut lines = Vec::with_capacity(ordered.len());
    for item in ordered {
        if item.quantity <= 0 {
            return Err(AppError::BadRequest("Cart has invalid quantity".into()));
        }

        let mut query = Products::find_by_id(item.product_id);
        if lock {
            query = query.lock(LockType::Update);
        }
        let product = match query.one(conn).await? {
            Some(p) => p,
            None => return Err(AppError::NotFound("Product")),
        };
        if !product.active {
            return Err(AppError::BadRequest(format!(
                "Product {} is unavailable",
                product.name
            )));
        }

        let variation = match item.variation_id {
            Some(variation_id) => {
                let mut query = Variations::find_by_id(variation_id);
                if lock {
                    query = query.lock(LockType::Update);
                }
                let variation = match query.one(conn).await? {
                    Some(v) => v,
                    None => return Err(AppError::NotFound("Variation")),
                };
                if variation.product_id != product.id {
                    return Err(AppError::BadRequest(
                        "Variation does not belong to product".into(),
                    ));
                }
                Some(variation)
            }
            None => None,
        };

        let unit_price = match &variation {
            Some(v) => v.price,
            None => pricing::effective_unit_price(
                product.price,
                product.discount_price,
                product.discount_percent,
            ),
        };
        let (color, size) = match &variation {
            Some(v) => (Some(v.color.clone()), Some(v.size.clone())),
            None => (item.color.clone(), item.size.clone()),
        };

        lines.push(ResolvedLine {
            product,
            variation,
            quantity: item.quantity,
            color,
            size,
            unit_price,
        });
    }

    Ok(lines)
}

/// Prices a client-held cart without touching it: resolves lines, applies the
/// optional coupon, and returns the authoritative totals.
pub async fn quote_cart(
    state: &AppState,
    payload: QuoteRequest,
) -> AppResult<ApiResponse<CartQuote>> {
    let resolved = resolve_lines(&state.orm, &payload.items, false).await?;
    let pricing_lines: Vec<PricingLine> =
        resolved.iter().map(ResolvedLine::pricing_line).collect();

    let coupon_code = payload
        .coupon_code
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());
    let (rule, summary) = match coupon_code {
        Some(code) => {
            let coupon = coupon_service::find_valid_coupon(&state.orm, code, false).await?;
            let rule = coupon_service::rule_for(&coupon)?;
            (Some(rule), Some(CouponSummary::from(&coupon)))
        }
        None => (None, None),
    };

    let totals = pricing::price_cart(
        &pricing_lines,
        rule.as_ref(),
        state.config.shipping_flat_fee,
        state.config.free_shipping_threshold,
    );

    let lines = resolved
        .iter()
        .map(|line| QuotedLine {
            product_id: line.product.id,
            variation_id: line.variation.as_ref().map(|v| v.id),
            name: line.product.name.clone(),
            color: line.color.clone(),
            size: line.size.clone(),
            quantity: line.quantity,
            unit_price: line.unit_price,
            line_total: line.line_total(),
        })
        .collect();

    Ok(ApiResponse::success(
        "Cart priced",
        CartQuote {
            lines,
            subtotal: totals.subtotal,
            shipping: totals.shipping,
            discount: totals.discount,
            total: totals.total,
            coupon: summary,
        },
        Some(Meta::empty()),
    ))
}
