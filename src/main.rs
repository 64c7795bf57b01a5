use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use pinboard::api;
use pinboard::assets::{AssetStore, DiskAssetStore};
use pinboard::config::Config;
use pinboard::db::{create_mongodb_client, ensure_indexes};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env().expect("Failed to load configuration");

    log::info!(
        "Starting server on {}:{}",
        config.server.host,
        config.server.port
    );

    let mongodb_db = create_mongodb_client(&config)
        .await
        .expect("Failed to create MongoDB client");
    ensure_indexes(&mongodb_db)
        .await
        .expect("Failed to create MongoDB indexes");

    log::info!("Database connection established");

    let asset_store: Arc<dyn AssetStore> = Arc::new(
        DiskAssetStore::new(&config.assets.root).expect("Failed to prepare asset storage"),
    );
    let asset_store = web::Data::from(asset_store);

    let openapi = api::ApiDoc::openapi();

    let server_host = config.server.host.clone();
    let server_port = config.server.port;
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(Cors::permissive())
            .app_data(web::Data::new(config.clone()))
            .app_data(web::Data::new(mongodb_db.clone()))
            .app_data(asset_store.clone())
            .route(
                "/api/docs",
                web::get().to(|| async {
                    actix_web::HttpResponse::PermanentRedirect()
                        .append_header(("Location", "/api/docs/"))
                        .finish()
                }),
            )
            .service(
                SwaggerUi::new("/api/docs/{_:.*}").url("/api-docs/openapi.json", openapi.clone()),
            )
            .service(
                web::scope("/api")
                    .service(
                        web::scope("/auth")
                            .route("/register", web::post().to(api::auth::register))
                            .route("/login", web::post().to(api::auth::login)),
                    )
                    .route("/feed", web::get().to(api::pins::get_feed))
                    .service(
                        web::scope("/pins")
                            .route("", web::post().to(api::pins::create_pin))
                            .route("/{pin_id}", web::get().to(api::pins::get_pin))
                            .route("/{pin_id}/like", web::post().to(api::pins::toggle_like))
                            .route("/{pin_id}/comment", web::post().to(api::pins::add_comment)),
                    )
                    .service(
                        web::scope("/users")
                            .route("/{username}", web::get().to(api::users::get_profile))
                            .route("/{user_id}/follow", web::post().to(api::users::toggle_follow)),
                    ),
            )
    })
    .bind(format!("{}:{}", server_host, server_port))?
    .run()
    .await
}
