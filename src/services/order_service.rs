use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::orders::{OrderList, OrderWithItems, PlaceOrderRequest},
    entity::{
        order_items::{
            ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems,
        },
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders},
        products::{Column as ProdCol, Entity as Products},
        users::Entity as Users,
        variations::{Column as VarCol, Entity as Variations},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Order, OrderItem},
    pricing::{self, PricingLine},
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    services::{
        cart_service::{self, ResolvedLine},
        coupon_service,
    },
    state::AppState,
};

pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all().add(OrderCol::UserId.eq(user.user_id));
    if let Some(status) = query.status.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(OrderCol::Status.eq(status.clone()));
    }

    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);

    let mut finder = Orders::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Order::from)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Orders",
        OrderList { items: orders },
        Some(meta),
    ))
}

/// Places an order from the client-held cart. Everything that has to stay
/// consistent runs in one transaction against locked rows: price resolution,
/// stock validation and decrement, coupon usage, and the order insert. The
/// confirmation email and audit entry run after commit and never fail the
/// request.
pub async fn place_order(
    state: &AppState,
    user: &AuthUser,
    payload: PlaceOrderRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    if payload.items.is_empty() {
        return Err(AppError::BadRequest("Cart is empty".into()));
    }
    if payload.address.trim().is_empty() {
        return Err(AppError::BadRequest("Address is required".into()));
    }
    if payload.phone.trim().is_empty() {
        return Err(AppError::BadRequest("Phone is required".into()));
    }
    if payload.payment_method.trim().is_empty() {
        return Err(AppError::BadRequest("Payment method is required".into()));
    }

    let txn = state.orm.begin().await?;

    let resolved = cart_service::resolve_lines(&txn, &payload.items, true).await?;

    for line in &resolved {
        if line.available_stock() < line.quantity {
            return Err(AppError::BadRequest(format!(
                "Insufficient stock for {}",
                line.product.name
            )));
        }
    }

    let coupon_code = payload
        .coupon_code
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());
    let coupon = match coupon_code {
        Some(code) => Some(coupon_service::find_valid_coupon(&txn, code, true).await?),
        None => None,
    };
    let rule = match &coupon {
        Some(c) => Some(coupon_service::rule_for(c)?),
        None => None,
    };

    let pricing_lines: Vec<PricingLine> =
        resolved.iter().map(ResolvedLine::pricing_line).collect();
    let totals = pricing::price_cart(
        &pricing_lines,
        rule.as_ref(),
        state.config.shipping_flat_fee,
        state.config.free_shipping_threshold,
    );

    for line in &resolved {
        match &line.variation {
            Some(variation) => {
                Variations::update_many()
                    .col_expr(
                        VarCol::Stock,
                        Expr::col(VarCol::Stock).sub(line.quantity),
                    )
                    .filter(VarCol::Id.eq(variation.id))
                    .exec(&txn)
                    .await?;
            }
            None => {
                Products::update_many()
                    .col_expr(
                        ProdCol::Stock,
                        Expr::col(ProdCol::Stock).sub(line.quantity),
                    )
                    .filter(ProdCol::Id.eq(line.product.id))
                    .exec(&txn)
                    .await?;
            }
        }
    }

    if let Some(c) = &coupon {
        use crate::entity::coupons::{Column as CouponCol, Entity as Coupons};
        Coupons::update_many()
            .col_expr(
                CouponCol::UsedCount,
                Expr::col(CouponCol::UsedCount).add(1),
            )
            .filter(CouponCol::Id.eq(c.id))
            .exec(&txn)
            .await?;
    }

    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        status: Set("pending".into()),
        subtotal: Set(totals.subtotal),
        shipping: Set(totals.shipping),
        discount: Set(totals.discount),
        total: Set(totals.total),
        coupon_id: Set(coupon.as_ref().map(|c| c.id)),
        address: Set(payload.address),
        phone: Set(payload.phone),
        payment_method: Set(payload.payment_method),
        payment_id: Set(None),
        payment_status: Set("unpaid".into()),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;

    let mut items: Vec<OrderItem> = Vec::with_capacity(resolved.len());
    for line in &resolved {
        let item = OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            product_id: Set(line.product.id),
            variation_id: Set(line.variation.as_ref().map(|v| v.id)),
            quantity: Set(line.quantity),
            unit_price: Set(line.unit_price),
            color: Set(line.color.clone()),
            size: Set(line.size.clone()),
            created_at: NotSet,
        }
        .insert(&txn)
        .await?;
        items.push(item.into());
    }

    txn.commit().await?;

    let api_order: Order = order.into();

    match Users::find_by_id(user.user_id).one(&state.orm).await {
        Ok(Some(account)) => {
            let lines = mail_item_lines(&resolved);
            if let Err(err) = state
                .mailer
                .send_order_confirmation(&account.email, &api_order, &lines)
                .await
            {
                tracing::warn!(error = %err, "order confirmation email failed");
            }
        }
        Ok(None) => {}
        Err(err) => tracing::warn!(error = %err, "order confirmation email skipped"),
    }

    if let Err(err) = log_audit(
        &state.orm,
        Some(user.user_id),
        "order_place",
        Some("orders"),
        Some(serde_json::json!({ "order_id": api_order.id, "total": api_order.total })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Order placed",
        OrderWithItems {
            order: api_order,
            items,
        },
        Some(Meta::empty()),
    ))
}

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let order = Orders::find()
        .filter(
            Condition::all()
                .add(OrderCol::UserId.eq(user.user_id))
                .add(OrderCol::Id.eq(id)),
        )
        .one(&state.orm)
        .await?;
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFound("Order")),
    };

    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(OrderItem::from)
        .collect();

    Ok(ApiResponse::success(
        "Order",
        OrderWithItems {
            order: order.into(),
            items,
        },
        Some(Meta::empty()),
    ))
}

fn mail_item_lines(resolved: &[ResolvedLine]) -> Vec<String> {
    resolved
        .iter()
        .map(|line| {
            let mut label = line.product.name.clone();
            if let (Some(color), Some(size)) = (&line.color, &line.size) {
                label = format!("{} ({}/{})", label, color, size);
            }
            format!("{} x {} @ {}", line.quantity, label, line.unit_price)
        })
        .collect()
}
