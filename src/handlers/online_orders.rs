use std::collections::{BTreeSet, HashMap};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, FixedOffset};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::{menu, online_order, order_item, restaurant};
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::guard::{owned_or_not_found, scope_to_owner};
use crate::handlers::{ensure_user_exists, to_column};
use crate::lifecycle::resolve_owner;
use crate::middleware::auth::CurrentUser;
use crate::money::Money;
use crate::pricing::{price_order, CatalogItem, LineResult, MenuCatalog, OrderLine, OrderQuote};
use crate::utils::time::now;
use crate::AppState;

const LABEL: &str = "Online order";

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct OrderItemRequest {
    pub menu_item_id: Uuid,
    pub quantity: i64,
}

impl From<OrderItemRequest> for OrderLine {
    fn from(item: OrderItemRequest) -> Self {
        OrderLine {
            menu_item_id: item.menu_item_id,
            quantity: item.quantity,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub restaurant_id: Uuid,
    pub items: Vec<OrderItemRequest>,
    pub order_status: Option<String>,
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateOrderRequest {
    pub restaurant_id: Option<Uuid>,
    pub items: Option<Vec<OrderItemRequest>>,
    pub order_status: Option<String>,
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct OrderQuoteRequest {
    pub items: Vec<OrderItemRequest>,
}

#[derive(Debug, Serialize)]
pub struct OrderQuoteResponse {
    pub items: Vec<LineResult>,
    pub total_amount: Money,
}

#[derive(Debug, Serialize)]
pub struct OrderItemResponse {
    pub id: Uuid,
    pub menu_item_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Serialize)]
pub struct OnlineOrderResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub restaurant_id: Uuid,
    pub order_status: String,
    pub total_amount: Money,
    pub items: Vec<OrderItemResponse>,
    pub created_at: DateTime<FixedOffset>,
}

impl OnlineOrderResponse {
    fn new(order: online_order::Model, items: Vec<order_item::Model>) -> Self {
        OnlineOrderResponse {
            id: order.id,
            user_id: order.user_id,
            restaurant_id: order.restaurant_id,
            order_status: order.order_status,
            total_amount: Money::from_cents(order.total_amount_cents),
            items: items
                .into_iter()
                .map(|i| OrderItemResponse {
                    id: i.id,
                    menu_item_id: i.menu_item_id,
                    quantity: i.quantity,
                })
                .collect(),
            created_at: order.created_at,
        }
    }
}

fn require_items(items: &[OrderItemRequest]) -> AppResult<()> {
    if items.is_empty() {
        return Err(AppError::validation("items", "This list may not be empty."));
    }
    Ok(())
}

/// Prices `lines` against the live menu rows they reference.
async fn quote_lines<C: ConnectionTrait>(conn: &C, lines: &[OrderLine]) -> AppResult<OrderQuote> {
    let ids: Vec<Uuid> = lines.iter().map(|l| l.menu_item_id).collect();
    let catalog: MenuCatalog = menu::Entity::find()
        .filter(menu::Column::Id.is_in(ids))
        .all(conn)
        .await?
        .into_iter()
        .map(|m| {
            (
                m.id,
                CatalogItem {
                    price: Money::from_cents(m.price_cents),
                    restaurant_id: m.restaurant_id,
                },
            )
        })
        .collect();

    Ok(price_order(lines, &catalog)?)
}

/// Every priced line must come from the order's own restaurant.
fn ensure_same_restaurant(quote: &OrderQuote, restaurant_id: Uuid) -> AppResult<()> {
    let foreign: BTreeSet<Uuid> = quote
        .lines
        .iter()
        .filter(|l| l.restaurant_id != restaurant_id)
        .map(|l| l.menu_item_id)
        .collect();

    if foreign.is_empty() {
        return Ok(());
    }

    let ids: Vec<String> = foreign.iter().map(Uuid::to_string).collect();
    Err(AppError::Integrity(format!(
        "Menu items {} do not belong to restaurant {}",
        ids.join(", "),
        restaurant_id
    )))
}

async fn ensure_restaurant<C: ConnectionTrait>(conn: &C, restaurant_id: Uuid) -> AppResult<()> {
    restaurant::Entity::find_by_id(restaurant_id)
        .one(conn)
        .await?
        .map(|_| ())
        .ok_or_else(|| AppError::NotFound("Restaurant not found".to_string()))
}

async fn insert_items<C: ConnectionTrait>(
    conn: &C,
    order_id: Uuid,
    quote: &OrderQuote,
) -> AppResult<Vec<order_item::Model>> {
    let mut items = Vec::with_capacity(quote.lines.len());
    for line in &quote.lines {
        items.push(order_item::Model {
            id: Uuid::new_v4(),
            order_id,
            menu_item_id: line.menu_item_id,
            quantity: to_column("quantity", line.quantity)?,
        });
    }

    let active: Vec<order_item::ActiveModel> = items.iter().cloned().map(Into::into).collect();
    order_item::Entity::insert_many(active)
        .exec_without_returning(conn)
        .await?;

    Ok(items)
}

/// Items of every order in `order_ids`, grouped by order.
async fn items_by_order<C: ConnectionTrait>(
    conn: &C,
    order_ids: Vec<Uuid>,
) -> AppResult<HashMap<Uuid, Vec<order_item::Model>>> {
    let mut grouped: HashMap<Uuid, Vec<order_item::Model>> = HashMap::new();
    if order_ids.is_empty() {
        return Ok(grouped);
    }

    let items = order_item::Entity::find()
        .filter(order_item::Column::OrderId.is_in(order_ids))
        .all(conn)
        .await?;
    for item in items {
        grouped.entry(item.order_id).or_default().push(item);
    }

    Ok(grouped)
}

/// Quote a basket without placing the order
pub async fn calculate_price(
    State(state): State<AppState>,
    AppJson(payload): AppJson<OrderQuoteRequest>,
) -> AppResult<Json<OrderQuoteResponse>> {
    require_items(&payload.items)?;

    let lines: Vec<OrderLine> = payload.items.into_iter().map(Into::into).collect();
    let quote = quote_lines(&state.db, &lines).await?;

    Ok(Json(OrderQuoteResponse {
        items: quote.lines,
        total_amount: quote.total_amount,
    }))
}

pub async fn list_orders(
    State(state): State<AppState>,
    Extension(actor): Extension<CurrentUser>,
) -> AppResult<Json<Vec<OnlineOrderResponse>>> {
    let orders = scope_to_owner(
        online_order::Entity::find(),
        online_order::Column::UserId,
        &actor,
    )
    .order_by_desc(online_order::Column::CreatedAt)
    .all(&state.db)
    .await?;

    let mut items = items_by_order(&state.db, orders.iter().map(|o| o.id).collect()).await?;

    let response = orders
        .into_iter()
        .map(|order| {
            let lines = items.remove(&order.id).unwrap_or_default();
            OnlineOrderResponse::new(order, lines)
        })
        .collect();

    Ok(Json(response))
}

pub async fn get_order(
    State(state): State<AppState>,
    Extension(actor): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<OnlineOrderResponse>> {
    let order = online_order::Entity::find_by_id(id).one(&state.db).await?;
    let order = owned_or_not_found(order, |o| o.user_id, &actor, LABEL)?;

    let items = order_item::Entity::find()
        .filter(order_item::Column::OrderId.eq(order.id))
        .all(&state.db)
        .await?;

    Ok(Json(OnlineOrderResponse::new(order, items)))
}

pub async fn create_order(
    State(state): State<AppState>,
    Extension(actor): Extension<CurrentUser>,
    AppJson(payload): AppJson<CreateOrderRequest>,
) -> AppResult<(StatusCode, Json<OnlineOrderResponse>)> {
    require_items(&payload.items)?;
    let owner = resolve_owner(&actor, payload.user_id, None)?;

    let txn = state.db.begin().await?;

    if owner != actor.id {
        ensure_user_exists(&txn, owner).await?;
    }
    ensure_restaurant(&txn, payload.restaurant_id).await?;

    let lines: Vec<OrderLine> = payload.items.into_iter().map(Into::into).collect();
    let quote = quote_lines(&txn, &lines).await?;
    ensure_same_restaurant(&quote, payload.restaurant_id)?;

    let order = online_order::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(owner),
        restaurant_id: Set(payload.restaurant_id),
        order_status: Set(payload
            .order_status
            .unwrap_or_else(|| online_order::DEFAULT_ORDER_STATUS.to_string())),
        total_amount_cents: Set(quote.total_amount.to_cents()?),
        created_at: Set(now()),
    }
    .insert(&txn)
    .await?;
    let items = insert_items(&txn, order.id, &quote).await?;

    txn.commit().await?;

    tracing::info!(
        order_id = %order.id,
        restaurant_id = %order.restaurant_id,
        lines = items.len(),
        total = %quote.total_amount,
        "Online order placed"
    );

    Ok((StatusCode::CREATED, Json(OnlineOrderResponse::new(order, items))))
}

/// Serves both `PUT` and `PATCH`. Supplied items replace the stored ones;
/// the total is repriced from live menu prices either way.
pub async fn update_order(
    State(state): State<AppState>,
    Extension(actor): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<UpdateOrderRequest>,
) -> AppResult<Json<OnlineOrderResponse>> {
    let txn = state.db.begin().await?;

    let existing = online_order::Entity::find_by_id(id).one(&txn).await?;
    let existing = owned_or_not_found(existing, |o| o.user_id, &actor, LABEL)?;

    let owner = resolve_owner(&actor, payload.user_id, Some(existing.user_id))?;
    if owner != existing.user_id {
        ensure_user_exists(&txn, owner).await?;
    }

    let restaurant_id = payload.restaurant_id.unwrap_or(existing.restaurant_id);
    if restaurant_id != existing.restaurant_id {
        ensure_restaurant(&txn, restaurant_id).await?;
    }

    let stored = order_item::Entity::find()
        .filter(order_item::Column::OrderId.eq(existing.id))
        .all(&txn)
        .await?;

    let replacing = payload.items.is_some();
    let lines: Vec<OrderLine> = match payload.items {
        Some(items) => {
            require_items(&items)?;
            items.into_iter().map(Into::into).collect()
        }
        None => stored
            .iter()
            .map(|i| OrderLine {
                menu_item_id: i.menu_item_id,
                quantity: i64::from(i.quantity),
            })
            .collect(),
    };

    let quote = quote_lines(&txn, &lines).await?;
    ensure_same_restaurant(&quote, restaurant_id)?;

    let order_status = payload
        .order_status
        .unwrap_or_else(|| existing.order_status.clone());

    let mut active: online_order::ActiveModel = existing.into();
    active.user_id = Set(owner);
    active.restaurant_id = Set(restaurant_id);
    active.order_status = Set(order_status);
    active.total_amount_cents = Set(quote.total_amount.to_cents()?);
    let order = active.update(&txn).await?;

    let items = if replacing {
        order_item::Entity::delete_many()
            .filter(order_item::Column::OrderId.eq(order.id))
            .exec(&txn)
            .await?;
        insert_items(&txn, order.id, &quote).await?
    } else {
        stored
    };

    txn.commit().await?;

    Ok(Json(OnlineOrderResponse::new(order, items)))
}

pub async fn delete_order(
    State(state): State<AppState>,
    Extension(actor): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let order = online_order::Entity::find_by_id(id).one(&state.db).await?;
    let order = owned_or_not_found(order, |o| o.user_id, &actor, LABEL)?;

    let txn = state.db.begin().await?;
    order_item::Entity::delete_many()
        .filter(order_item::Column::OrderId.eq(order.id))
        .exec(&txn)
        .await?;
    online_order::Entity::delete_by_id(order.id).exec(&txn).await?;
    txn.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(menu_item_id: u128, restaurant_id: u128) -> LineResult {
        LineResult {
            menu_item_id: Uuid::from_u128(menu_item_id),
            restaurant_id: Uuid::from_u128(restaurant_id),
            unit_price: Money::from_cents(1000),
            quantity: 1,
            subtotal: Money::from_cents(1000),
        }
    }

    #[test]
    fn test_foreign_menu_items_are_listed_once() {
        let quote = OrderQuote {
            lines: vec![line(3, 9), line(1, 7), line(3, 9)],
            total_amount: Money::from_cents(3000),
        };

        let err = ensure_same_restaurant(&quote, Uuid::from_u128(7)).unwrap_err();
        match err {
            AppError::Integrity(msg) => {
                assert_eq!(msg.matches(&Uuid::from_u128(3).to_string()).count(), 1);
                assert!(!msg.contains(&Uuid::from_u128(1).to_string()));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_empty_basket_rejected() {
        assert!(matches!(
            require_items(&[]),
            Err(AppError::Validation { .. })
        ));
    }
}
