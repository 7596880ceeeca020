use actix_cors::Cors;
use actix_web::{App, HttpServer, web};
use dotenv::dotenv;
use tracing::info;
use tracing_subscriber::EnvFilter;

use solidaria::config::AppConfig;
use solidaria::database::connection;
use solidaria::routes;
use solidaria::services::generation::GeminiClient;
use solidaria::services::storage::StorageClient;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env()?;

    let pool = connection::init_pool(&config.database_url).await?;
    sqlx::migrate!().run(&pool).await?;

    let pool = web::Data::new(pool);
    let storage = web::Data::new(StorageClient::new()?);
    let generator = web::Data::new(GeminiClient::new()?);

    info!("Starting server on {}:{}", config.host, config.port);
    HttpServer::new(move || {
        App::new()
            .app_data(pool.clone())
            .app_data(storage.clone())
            .app_data(generator.clone())
            .wrap(Cors::permissive())
            .service(web::scope("/api").configure(routes::api::scoped_config))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;

    Ok(())
}
