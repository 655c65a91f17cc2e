use std::time::Duration;

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use sqlx::postgres::PgPoolOptions;

use todohive::auth::AuthGuard;
use todohive::config::Config;
use todohive::routes;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = Config::from_env();

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    let bind_addr = (config.server_host.clone(), config.server_port);
    log::info!("Starting Todohive server at {}", config.server_url());

    let config = web::Data::new(config);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&config.cors_origin)
            .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE"])
            .allow_any_header()
            .supports_credentials()
            .max_age(3600);

        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(config.clone())
            .wrap(cors)
            .wrap(Logger::default())
            .service(routes::health::index)
            .service(routes::health::health)
            .service(
                web::scope("/api")
                    .wrap(AuthGuard)
                    .configure(routes::config),
            )
            .default_service(web::route().to(routes::not_found))
    })
    .bind(bind_addr)?
    .run()
    .await
}
