use poem::{listener::TcpListener, EndpointExt, Route, Server};
use poem_openapi::OpenApiService;
use sea_orm::{Database, DatabaseConnection};

use migration::{Migrator, MigratorTrait};

use courseledger_backend::api::{AuthApi, CourseApi, HealthApi, PointsApi, UserApi};
use courseledger_backend::app_data::AppData;
use courseledger_backend::config::{self, AppSettings};

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    config::init_logging().expect("Failed to initialize logging");

    let settings = AppSettings::from_env().expect("Failed to load settings");
    tracing::info!("Loaded settings: {}", settings);

    let db: DatabaseConnection = Database::connect(&settings.database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Connected to database");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    tracing::info!("Database migrations completed");

    let app_data = AppData::init(db, &settings).expect("Failed to initialize application data");

    let auth_api = AuthApi::new(
        app_data.user_store.clone(),
        app_data.token_service.clone(),
        app_data.otp.clone(),
    );
    let course_api = CourseApi::new(
        app_data.course_store.clone(),
        app_data.recommendation_store.clone(),
        app_data.registration_store.clone(),
        app_data.user_store.clone(),
        app_data.token_service.clone(),
        app_data.blob_store.clone(),
    );
    let points_api = PointsApi::new(
        app_data.points_store.clone(),
        app_data.user_store.clone(),
        app_data.token_service.clone(),
        app_data.importer.clone(),
    );
    let user_api = UserApi::new(
        app_data.user_store.clone(),
        app_data.token_service.clone(),
        app_data.importer.clone(),
    );

    let api_service = OpenApiService::new(
        (HealthApi, auth_api, course_api, points_api, user_api),
        "Course Ledger API",
        env!("CARGO_PKG_VERSION"),
    )
    .server("http://localhost:3000/api/v1");

    let ui = api_service.swagger_ui();

    let app = Route::new()
        .nest("/api/v1", api_service)
        .nest("/swagger", ui)
        .with(poem::middleware::Tracing);

    tracing::info!("Starting server on http://{}", settings.bind_addr);
    tracing::info!("Swagger UI available at /swagger");

    Server::new(TcpListener::bind(settings.bind_addr.clone()))
        .run(app)
        .await
}
