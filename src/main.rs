mod controllers {
    pub mod cart;
    pub mod categories;
    pub mod coupons;
    pub mod delivery;
    pub mod functions;
    pub mod orders;
    pub mod products;
    pub mod users;
}
mod insertables;
use actix_web::{web, App, HttpServer};
use controllers::cart;
use controllers::categories;
use controllers::coupons;
use controllers::delivery;
use controllers::orders;
use controllers::products;
use controllers::users;
use diesel::{r2d2, PgConnection};
use dotenvy::dotenv;
use std::env;
use tracing_subscriber::EnvFilter;
type DbPool = r2d2::Pool<r2d2::ConnectionManager<PgConnection>>;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let db_pool = initialize_db_pool();
    let port = env::var("PORT")
        .expect("env_err")
        .parse::<u16>()
        .expect("parse_err");
    tracing::info!(%port, "starting storefront api");
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(db_pool.clone()))
            .service(users::get_users)
            .service(users::get_user)
            .service(users::create_user)
            .service(users::delete_user)
            .service(users::get_addresses)
            .service(users::create_address)
            .service(users::update_address)
            .service(users::delete_address)
            .service(categories::get_categories)
            .service(categories::get_category)
            .service(categories::create_category)
            .service(categories::update_category)
            .service(categories::delete_category)
            // fixed product paths go before the {slug} matcher
            .service(products::search_suggestions)
            .service(products::storefront)
            .service(products::get_products)
            .service(products::get_product)
            .service(products::create_product)
            .service(products::update_product)
            .service(products::delete_product)
            .service(cart::view_cart)
            .service(cart::add_item)
            .service(cart::update_item)
            .service(cart::remove_item)
            .service(cart::cart_count)
            .service(coupons::get_coupons)
            .service(coupons::get_coupon)
            .service(coupons::create_coupon)
            .service(coupons::update_coupon)
            .service(coupons::delete_coupon)
            // fixed order paths go before the {order_id} matcher
            .service(orders::checkout)
            .service(orders::apply_coupon)
            .service(orders::place_order)
            .service(orders::get_orders)
            .service(orders::order_confirmation)
            .service(orders::get_order)
            .service(orders::admin_orders)
            .service(delivery::update_order_status)
            .service(delivery::order_tracking)
    })
    .bind(("127.0.0.1", port))?
    .run()
    .await
}

fn initialize_db_pool() -> DbPool {
    let conn_spec = std::env::var("DATABASE_URL").expect("Variable not defined");
    let manager = r2d2::ConnectionManager::<PgConnection>::new(conn_spec);
    r2d2::Pool::builder().build(manager).expect("DB Error")
}
