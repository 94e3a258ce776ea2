//! TubeDesk - management backend for YouTube channels, ad campaigns and team workflows

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tubedesk::{
    api::{self, AppState},
    config::Config,
    db::{
        self,
        repositories::{
            SqlxCampaignRepository, SqlxChannelRepository, SqlxRevenueRepository,
            SqlxTaskCommentRepository, SqlxTaskRepository, SqlxUserRepository,
            SqlxVideoCategoryRepository, SqlxVideoRepository,
        },
        seed,
    },
    services::{
        campaign::CampaignService, channel::ChannelService, oauth::OauthService,
        revenue::RevenueService, task::TaskService, user::UserService, video::VideoService,
        video_category::CategoryService,
    },
};

#[tokio::main]
async fn main() {
    // Initialize tracing first so startup failures are logged
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tubedesk=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        // Fatal startup error: log and exit non-zero. The fmt layer
        // writes per event, so nothing is left buffered.
        tracing::error!("Startup failed: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    tracing::info!("Starting TubeDesk backend...");

    // Load layered configuration (base + APP_ENV overlay + env vars)
    let config = Config::load_layered(Path::new("config.yml"))?;
    tracing::info!("Configuration loaded");

    // Initialize database
    let pool = db::create_pool(&config.database).await?;
    tracing::info!("Database connected: {:?}", config.database.driver);

    // Run migrations
    db::migrations::run_migrations(&pool).await?;
    tracing::info!("Database migrations completed");

    // Create repositories
    let user_repo = SqlxUserRepository::shared(pool.clone());
    let channel_repo = SqlxChannelRepository::shared(pool.clone());
    let category_repo = SqlxVideoCategoryRepository::shared(pool.clone());
    let video_repo = SqlxVideoRepository::shared(pool.clone());
    let campaign_repo = SqlxCampaignRepository::shared(pool.clone());
    let revenue_repo = SqlxRevenueRepository::shared(pool.clone());
    let task_repo = SqlxTaskRepository::shared(pool.clone());
    let task_comment_repo = SqlxTaskCommentRepository::shared(pool.clone());

    // Seed baseline data. Seeding must never block startup: a failure
    // is logged and the server comes up anyway.
    match seed::run_seed(&config.seed, &category_repo, &user_repo).await {
        Ok(count) if count > 0 => tracing::info!("Seeded {} record(s)", count),
        Ok(_) => tracing::debug!("Seed data already present"),
        Err(e) => tracing::warn!("Seeding failed, continuing startup: {:#}", e),
    }

    // Initialize services
    let user_service = Arc::new(UserService::new(user_repo.clone(), config.jwt.clone()));
    let oauth_service = Arc::new(OauthService::new(
        config.oauth.google.clone(),
        config.jwt.clone(),
        user_repo.clone(),
    ));
    let channel_service = Arc::new(ChannelService::new(channel_repo.clone()));
    let video_service = Arc::new(VideoService::new(
        video_repo.clone(),
        channel_repo,
        category_repo.clone(),
    ));
    let category_service = Arc::new(CategoryService::new(category_repo, video_repo));
    let campaign_service = Arc::new(CampaignService::new(campaign_repo.clone()));
    let revenue_service = Arc::new(RevenueService::new(revenue_repo, campaign_repo));
    let task_service = Arc::new(TaskService::new(task_repo, task_comment_repo, user_repo));

    // Build application state
    let state = AppState {
        jwt: config.jwt.clone(),
        user_service,
        oauth_service,
        channel_service,
        video_service,
        category_service,
        campaign_service,
        revenue_service,
        task_service,
    };

    // Build router
    let app = api::build_router(state, &config.server);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
