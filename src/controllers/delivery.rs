use crate::controllers::orders;
use crate::insertables::{NewDeliveryStatusUpdate, NewDeliveryTracking};
use actix_web::{get, post, web, HttpResponse, Responder, Result};
use chrono::Utc;
use diesel::{prelude::*, r2d2};
use schema::delivery_tracking::dsl::*;
use serde::{Deserialize, Serialize};
use serde_json::json;
use storefront_api::error::StoreError;
use storefront_api::models::{DeliveryStatusUpdate, DeliveryTracking, Order, OrderStatus};
use storefront_api::schema;
type DbPool = r2d2::Pool<r2d2::ConnectionManager<PgConnection>>;

#[derive(Deserialize)]
pub struct UpdateStatusDto {
    pub order_id: i32,
    pub status: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub notes: String,
}

#[derive(Deserialize)]
pub struct OwnerQuery {
    pub user_id: i32,
}

#[derive(Serialize)]
pub struct TrackingView {
    pub tracking: DeliveryTracking,
    pub status_updates: Vec<DeliveryStatusUpdate>,
}

/// Moves the order to `status` and appends the matching tracking log entry,
/// creating the tracking record on first use. The log is append-only; entries
/// are never rewritten.
pub fn append_status_update(
    conn: &mut PgConnection,
    form: &UpdateStatusDto,
) -> Result<(), StoreError> {
    let parsed = OrderStatus::parse(&form.status)
        .ok_or_else(|| StoreError::InvalidStatus(form.status.clone()))?;
    conn.transaction::<_, StoreError, _>(|conn| {
        let order = schema::orders::table
            .filter(schema::orders::id.eq(form.order_id))
            .first::<Order>(conn)
            .optional()?
            .ok_or(StoreError::NotFound("order"))?;
        let now = Utc::now();

        diesel::update(&order)
            .set((
                schema::orders::status.eq(parsed.as_str()),
                schema::orders::updated_at.eq(now),
            ))
            .execute(conn)?;

        let tracking = delivery_tracking
            .filter(order_id.eq(order.id))
            .first::<DeliveryTracking>(conn)
            .optional()?;
        let tracking = match tracking {
            Some(existing) => existing,
            None => diesel::insert_into(delivery_tracking)
                .values(&NewDeliveryTracking {
                    order_id: order.id,
                    current_location: String::new(),
                    notes: String::new(),
                })
                .get_result(conn)?,
        };

        diesel::update(&tracking)
            .set((
                current_location.eq(&form.location),
                notes.eq(&form.notes),
                updated_at.eq(now),
            ))
            .execute(conn)?;

        diesel::insert_into(schema::delivery_status_updates::table)
            .values(&NewDeliveryStatusUpdate {
                tracking_id: tracking.id,
                status: parsed.as_str().to_owned(),
                location: form.location.clone(),
                notes: form.notes.clone(),
            })
            .execute(conn)?;

        tracing::info!(
            order_number = %order.order_number,
            status = parsed.as_str(),
            "order status updated"
        );
        Ok(())
    })
}

pub fn get_order_tracking(
    conn: &mut PgConnection,
    _user_id: i32,
    _order_id: i32,
) -> Result<TrackingView, StoreError> {
    let order = orders::get_order_for_user(conn, _user_id, _order_id)?;
    let tracking = delivery_tracking
        .filter(order_id.eq(order.id))
        .first::<DeliveryTracking>(conn)
        .optional()?
        .ok_or(StoreError::NotFound("delivery tracking"))?;
    let status_updates = schema::delivery_status_updates::table
        .filter(schema::delivery_status_updates::tracking_id.eq(tracking.id))
        .order(schema::delivery_status_updates::timestamp.asc())
        .select(DeliveryStatusUpdate::as_select())
        .load(conn)?;
    Ok(TrackingView {
        tracking,
        status_updates,
    })
}

#[post("/api/admin/orders/update_status")]
async fn update_order_status(
    pool: web::Data<DbPool>,
    form: web::Json<UpdateStatusDto>,
) -> Result<impl Responder> {
    web::block(move || {
        let mut conn = pool.get().map_err(StoreError::from)?;
        append_status_update(&mut conn, &form)
    })
    .await??;
    Ok(HttpResponse::Ok().json(json!({"success": true})))
}

#[get("/api/orders/{order_id}/tracking")]
async fn order_tracking(
    pool: web::Data<DbPool>,
    order_id_path: web::Path<i32>,
    params: web::Query<OwnerQuery>,
) -> Result<impl Responder> {
    let view = web::block(move || {
        let mut conn = pool.get().map_err(StoreError::from)?;
        get_order_tracking(&mut conn, params.user_id, *order_id_path)
    })
    .await??;
    Ok(HttpResponse::Ok().json(view))
}
