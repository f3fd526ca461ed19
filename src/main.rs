mod app;
mod core;
mod features;
mod modules;
mod shared;

use crate::app::{create_app, AppServices};
use crate::core::config::Config;
use crate::core::database;
use crate::core::error::expose_error_details;
use crate::core::shutdown::Shutdown;
use crate::features::articles::handlers::ArticleState;
use crate::features::articles::repositories::PgArticleRepository;
use crate::features::articles::services::ArticleService;
use crate::features::auth::services::{AuthService, TokenService};
use crate::features::users::PgUserRepository;
use crate::modules::storage::{
    FallbackStorage, LocalStore, MinIOClient, StorageBackend, UploadPolicy,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    // Build Tokio runtime with configurable worker threads
    let worker_threads = std::env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
        });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .max_blocking_threads(worker_threads * 4)
        .enable_all()
        .build()?;

    let shutdown = Shutdown::new();
    runtime.block_on(async_main(worker_threads, shutdown.clone()))?;

    if shutdown.is_fatal() {
        std::process::exit(1);
    }

    Ok(())
}

async fn async_main(worker_threads: usize, shutdown: Shutdown) -> anyhow::Result<()> {
    // Load .env file BEFORE initializing logger so RUST_LOG is available
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    shutdown.install_panic_hook();

    // Load configuration
    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;
    expose_error_details(config.app.is_development());

    // Log system info
    let available_cpus = std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(1);
    tracing::info!(
        "System info: available_cpus={}, tokio_worker_threads={}, pid={}",
        available_cpus,
        worker_threads,
        std::process::id()
    );

    tracing::info!(
        "Configuration loaded successfully (environment={})",
        config.app.environment
    );

    // Create database connection pool
    let pool = database::create_pool(&config.database).await?;
    tracing::info!("Database connection pool created");

    // Run migrations automatically
    tracing::info!("Running database migrations...");
    database::run_migrations(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;
    tracing::info!("Database migrations completed successfully");

    // Initialize auth
    let user_repository = Arc::new(PgUserRepository::new(pool.clone()));
    let token_service = Arc::new(TokenService::new(&config.auth));
    let auth_service = Arc::new(AuthService::new(user_repository, token_service));
    tracing::info!("Auth service initialized");

    if config.app.seed_default_users {
        let created = auth_service
            .seed_default_users()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to seed default users: {}", e))?;
        tracing::info!("Seeded {} default user(s)", created);
    }

    // Initialize storage: MinIO first when configured, local directory always
    let mut backends: Vec<Arc<dyn StorageBackend>> = Vec::new();
    match config.minio.clone() {
        Some(minio_config) => match MinIOClient::new(minio_config).await {
            Ok(client) => backends.push(Arc::new(client)),
            Err(e) => tracing::warn!(
                "Failed to initialize MinIO client, using local storage only: {}",
                e
            ),
        },
        None => tracing::warn!("MINIO_ENDPOINT not set, using local storage only"),
    }

    let local_store = LocalStore::new(config.storage.upload_dir.clone());
    local_store
        .ensure_dir()
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;
    tracing::info!(
        "Local upload directory: {}",
        local_store.root().display()
    );
    backends.push(Arc::new(local_store));

    let storage = Arc::new(FallbackStorage::new(backends));
    tracing::info!(
        "Storage initialized (backends: {})",
        storage.backend_names().join(" -> ")
    );

    // Initialize articles
    let article_repository = Arc::new(PgArticleRepository::new(pool.clone()));
    let article_state = Arc::new(ArticleState {
        service: ArticleService::new(
            article_repository,
            storage,
            config.articles.status_policy,
        ),
        upload_policy: UploadPolicy::new(config.storage.max_file_size),
    });
    tracing::info!(
        "Article service initialized (status policy: {:?}, max file size: {} bytes)",
        config.articles.status_policy,
        config.storage.max_file_size
    );

    let app = create_app(
        &config,
        AppServices {
            auth: auth_service,
            articles: article_state,
        },
    );

    // Start server
    let addr = config.app.server_address();
    let socket_addr: std::net::SocketAddr = addr
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address: {}", e))?;

    // Use socket2 for TCP listener configuration
    let socket = socket2::Socket::new(
        socket2::Domain::for_address(socket_addr),
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;

    socket.set_reuse_address(true)?;
    #[cfg(unix)]
    socket.set_reuse_port(true)?;
    socket.set_nodelay(true)?;

    #[cfg(target_os = "linux")]
    {
        let keepalive = socket2::TcpKeepalive::new()
            .with_time(std::time::Duration::from_secs(60))
            .with_interval(std::time::Duration::from_secs(10))
            .with_retries(3);
        socket.set_tcp_keepalive(&keepalive)?;
    }
    #[cfg(not(target_os = "linux"))]
    {
        let keepalive = socket2::TcpKeepalive::new().with_time(std::time::Duration::from_secs(60));
        socket.set_tcp_keepalive(&keepalive)?;
    }

    socket.set_nonblocking(true)?;
    socket.bind(&socket_addr.into())?;
    socket.listen(1024)?;

    let listener = tokio::net::TcpListener::from_std(socket.into())?;
    tracing::info!("Server listening on {}", format!("http://{}", addr));
    tracing::info!(
        "Swagger UI available at {}",
        format!("http://{}/swagger-ui/", addr)
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.clone().wait())
        .await?;

    pool.close().await;
    tracing::info!("Server stopped");

    Ok(())
}
