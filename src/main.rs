use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use sqlx::PgPool;

use todovault::auth::{AuthMiddleware, TokenKeys};
use todovault::config::Config;
use todovault::routes::{self, health};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = Config::from_env();

    let pool = PgPool::connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    // The signing keys are built once from the configured secret and shared
    // read-only with every worker.
    let token_keys = web::Data::new(TokenKeys::from_secret(&config.jwt_secret));

    log::info!("Starting todovault server at {}", config.server_url());

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(token_keys.clone())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .service(health::health)
            .service(web::scope("").wrap(AuthMiddleware).configure(routes::config))
    })
    .bind((config.server_host.clone(), config.server_port))?
    .run()
    .await
}
