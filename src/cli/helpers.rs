//! Shared helper functions for CLI commands

use chrono::NaiveDate;
use clap::Args;
use feedback_desk_core::{error::Result, AdminSession, AdminView, AppConfig, ViewCriteria};
use std::sync::Arc;
use tracing::debug;

/// Filters shared by the admin commands
#[derive(Debug, Clone, Args)]
pub struct FilterArgs {
    /// Ratings to include, comma-separated (default: all)
    #[arg(long)]
    pub ratings: Option<String>,

    /// First day to include, YYYY-MM-DD (default: earliest stored)
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// Last day to include, YYYY-MM-DD (default: latest stored)
    #[arg(long)]
    pub end: Option<NaiveDate>,
}

impl FilterArgs {
    pub fn criteria(&self) -> Result<ViewCriteria> {
        ViewCriteria::from_params(self.ratings.as_deref(), self.start, self.end)
    }
}

/// Admin password supplied on the command line
#[derive(Debug, Clone, Args)]
pub struct LoginArgs {
    /// Admin password
    #[arg(long, env = "FEEDBACK_LOGIN_PASSWORD", hide_env_values = true)]
    pub password: String,
}

/// Authenticate and open the admin view over the configured store
pub fn admin_view(config: &AppConfig, login: &LoginArgs) -> Result<(AdminSession, AdminView)> {
    let mut session = AdminSession::new();
    session.login(&config.admin_credential(), &login.password)?;

    debug!("Admin view over {}", config.data_file.display());
    let store = Arc::new(config.open_store());
    let view = AdminView::new(store).with_threshold(config.low_rating_threshold);
    Ok((session, view))
}
