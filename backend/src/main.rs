mod analysis;
mod config;
mod error;
mod routes;
mod storage;
mod tasks;

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{App, HttpServer, web};
use analysis::Analyzer;
use config::ServerConfig;
use routes::configure_routes;
use std::env;
use storage::upload_store::UploadStore;
use tasks::task_service::TaskService;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    if let Ok(current_dir) = env::current_dir() {
        log::info!("Current working directory: {}", current_dir.display());
    } else {
        log::error!("Failed to get the current working directory.");
    }

    let config = ServerConfig::from_env().map_err(|e| {
        log::error!("Invalid configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
    })?;

    std::fs::create_dir_all(&config.upload_dir)?;
    std::fs::create_dir_all(&config.result_dir)?;
    log::info!(
        "Uploads in {}, results in {}",
        config.upload_dir.display(),
        config.result_dir.display()
    );
    log::info!("Analysis settings: {:?}", config.analysis);

    let analyzer = web::Data::new(Analyzer::new(config.analysis.clone(), &config.result_dir));
    let uploads = web::Data::new(UploadStore::new(&config.upload_dir));
    let tasks = web::Data::new(TaskService::with_ttl(chrono::Duration::seconds(
        config.task_ttl_secs,
    )));

    let bind_address = config.bind_address();
    log::info!("Starting server on {}", bind_address);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allowed_methods(vec!["GET", "POST", "OPTIONS"])
                    .allowed_headers(vec![
                        actix_web::http::header::ACCEPT,
                        actix_web::http::header::CONTENT_TYPE,
                    ])
                    .max_age(3600),
            )
            .app_data(analyzer.clone())
            .app_data(uploads.clone())
            .app_data(tasks.clone())
            .configure(|cfg| {
                configure_routes(cfg, config.upload_dir.clone(), config.result_dir.clone())
            })
    })
    .bind(&bind_address)?
    .run()
    .await
}
