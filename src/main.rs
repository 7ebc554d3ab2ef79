use clap::Parser;
use octocrab::Octocrab;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pr_gatekeeper::config::Cli;
use pr_gatekeeper::server::{AppState, build_router};
use pr_gatekeeper::webhooks::WebhookSecret;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pr_gatekeeper=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = cli.gatekeeper_config();

    let github = Octocrab::builder()
        .personal_token(cli.github_token.clone())
        .build()?;
    let secret = cli.webhook_secret.as_deref().map(WebhookSecret::new);
    if secret.is_none() {
        tracing::warn!("No webhook secret configured; signatures will not be verified");
    }

    tracing::info!(
        max_open_prs = config.max_open_prs_per_author,
        checklist_marker = %config.checklist_marker,
        "Starting gatekeeper"
    );
    let app = build_router(AppState::new(github, config, secret));

    let listener = tokio::net::TcpListener::bind(cli.listen).await?;
    tracing::info!("listening on {}", cli.listen);
    axum::serve(listener, app).await?;
    Ok(())
}
