use crate::{api, api::handlers::auth::AuthConfig, cli::actions::Action};
use anyhow::{Context, Result};
use url::Url;

/// Handle the server action
pub async fn handle(action: Action) -> Result<()> {
    match action {
        Action::Server {
            port,
            dsn,
            frontend_url,
            session_ttl,
        } => {
            // Fail on malformed connection strings here instead of deep in pool setup.
            let dsn = Url::parse(&dsn).context("Invalid database DSN")?;

            let config = AuthConfig::new(frontend_url).with_session_ttl_seconds(session_ttl);

            api::new(port, dsn.as_str(), config).await?;
        }
    }

    Ok(())
}
