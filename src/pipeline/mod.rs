pub mod changes;
pub mod classify;
pub mod fetch;
pub mod html;
pub mod publish;
pub mod query;
pub mod update;

use std::path::PathBuf;

use anyhow::{anyhow, Context};
use log::{debug, info};

use crate::config::AppConfig;
use crate::error::StepError;
use crate::providers::{Clients, Tracker};
use classify::Classifier;

#[derive(Debug, Default, Clone)]
pub struct RunOptions {
    /// Overrides `[changes].version`.
    pub release_version: Option<String>,
}

#[derive(Debug, Default, PartialEq)]
pub struct RunSummary {
    pub fetched: usize,
    pub published: bool,
    pub changes_file: Option<PathBuf>,
    pub updated: usize,
}

async fn authenticate(config: &AppConfig, tracker: &dyn Tracker) -> anyhow::Result<String> {
    let user = config.alm.user.as_deref().context("No HP ALM user configured")?;
    let password = config
        .alm
        .password
        .as_deref()
        .context("No HP ALM password configured")?;
    tracker
        .authenticate(&config.alm.authentication_url(), user, password)
        .await
}

/// Run every configured step once, in order. The first failing step ends the run.
pub async fn run(
    config: &AppConfig,
    clients: &Clients,
    options: &RunOptions,
) -> Result<RunSummary, StepError> {
    let mut summary = RunSummary::default();
    let tracker = clients.tracker.as_ref();

    info!("Authenticating to HP ALM...");
    let cookie = authenticate(config, tracker)
        .await
        .map_err(StepError::Authentication)?;

    info!("Preparing HP ALM query statement...");
    let query = query::build_query(
        config.query.statement.as_deref(),
        config.query.values.as_ref(),
    )
    .map_err(|e| StepError::QueryBuild(e.into()))?;
    debug!("Final HP ALM query: {query}");

    info!("Executing HP ALM query...");
    let classifier = Classifier::from_config(&config.changes);
    let entities = fetch::fetch_entities(tracker, &config.alm, &query, &cookie, &classifier)
        .await
        .map_err(StepError::Fetch)?;
    summary.fetched = entities.len();
    info!("Fetched {} defects", entities.len());

    if let Some(confluence) = &config.confluence {
        info!("Generating summary HTML table for Confluence...");
        let table = html::render_table(
            &entities,
            &config.export.columns,
            &config.export.translations,
        )
        .map_err(|e| StepError::Render(e.into()))?;
        debug!("Generated HTML code: {table}");

        info!("Updating Confluence page {}...", confluence.page_id);
        let wiki = clients
            .wiki
            .as_deref()
            .ok_or_else(|| StepError::Publish(anyhow!("No Confluence client available")))?;
        publish::publish(wiki, confluence, &table)
            .await
            .map_err(StepError::Publish)?;
        summary.published = true;
    }

    if let Some(path) = &config.changes.output {
        info!("Generating changes file {}...", path.display());
        let version = options
            .release_version
            .as_deref()
            .or(config.changes.version.as_deref())
            .ok_or_else(|| StepError::ChangelogWrite(anyhow!("No release version configured")))?;
        changes::write_changes(path, &entities, version).map_err(StepError::ChangelogWrite)?;
        summary.changes_file = Some(path.clone());
    }

    if !config.update.values.is_empty() {
        info!("Updating HP ALM entities...");
        summary.updated = update::update_entities(
            tracker,
            &config.alm,
            &cookie,
            &entities,
            &config.update.values,
        )
        .await
        .map_err(StepError::Update)?;
    }

    Ok(summary)
}
