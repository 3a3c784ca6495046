use affiliation_history::{
    parse_entity_ref, portrait_url, AppConfig, ClassificationTable, EsiGateway, FeedOrder,
    HistoryEngine, Reconstruction,
};
use anyhow::{Context, Result};
use clap::Parser;
use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Reconstruct a character's corporation and alliance history
#[derive(Debug, Parser)]
#[command(name = "affiliation-history", version)]
struct Cli {
    /// Character id or profile URL (e.g. https://zkillboard.com/character/454518485/)
    entity: String,

    /// JSON configuration file
    #[arg(long, env = "AFFILIATION_CONFIG")]
    config: Option<PathBuf>,

    /// JSON classification table replacing the built-in one
    #[arg(long, env = "AFFILIATION_CLASSIFICATION")]
    classification: Option<PathBuf>,

    #[arg(long, env = "AFFILIATION_ESI_BASE_URL")]
    base_url: Option<String>,

    #[arg(long, env = "AFFILIATION_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,

    #[arg(long, env = "AFFILIATION_USER_AGENT")]
    user_agent: Option<String>,

    /// Chronological order of the history feeds (ESI: newest-first)
    #[arg(long, value_enum, env = "AFFILIATION_FEED_ORDER")]
    feed_order: Option<FeedOrder>,

    /// Print the reconstruction as JSON instead of a tree
    #[arg(long)]
    json: bool,
}

impl Cli {
    /// File settings first, then flags/env on top
    fn app_config(&self) -> Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::from_file(path)?,
            None => AppConfig::default(),
        };

        if let Some(base_url) = &self.base_url {
            config.gateway.base_url = base_url.clone();
        }
        if let Some(timeout_secs) = self.timeout_secs {
            config.gateway.timeout_secs = timeout_secs;
        }
        if let Some(user_agent) = &self.user_agent {
            config.gateway.user_agent = user_agent.clone();
        }
        if let Some(feed_order) = self.feed_order {
            config.engine.feed_order = Some(feed_order);
        }

        Ok(config)
    }

    fn classification(&self) -> Result<Arc<ClassificationTable>> {
        match &self.classification {
            Some(path) => Ok(Arc::new(ClassificationTable::from_file(path)?)),
            None => Ok(ClassificationTable::builtin()),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.app_config()?;
    let entity_id = parse_entity_ref(&cli.entity)?;

    let classification = cli.classification()?;
    let gateway = EsiGateway::new(&config.gateway).context("Failed to build ESI client")?;
    let engine = HistoryEngine::new(gateway, Arc::clone(&classification), config.engine);
    tracing::debug!(feed_order = ?engine.feed_order(), "engine ready");

    let reconstruction = engine
        .reconstruct(entity_id)
        .await
        .with_context(|| format!("Failed to load history for {}", entity_id))?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&reconstruction)?);
    } else {
        print!("{}", render_tree(&reconstruction, &classification));
    }

    // Tree first, then the batch of notices
    for line in reconstruction.warnings.notice_batch() {
        eprintln!("⚠️  {}", line);
    }

    Ok(())
}

/// Flag marker, with the cohort when the table knows it
fn marker(table: &ClassificationTable, id: i64, is_flagged: bool, plain: &str) -> String {
    match (is_flagged, table.lookup(id)) {
        (true, Some(cohort)) => format!("★ [{}]", cohort.as_str()),
        (true, None) => "★".to_string(),
        (false, _) => plain.to_string(),
    }
}

fn render_tree(reconstruction: &Reconstruction, table: &ClassificationTable) -> String {
    let entity = &reconstruction.entity;
    let mut out = String::new();
    let rule = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

    let _ = writeln!(out, "👤 {} ({})", entity.display_name, entity.id);
    let _ = writeln!(out, "   {}", portrait_url(entity.id));
    if let Some(current) = entity.current_group() {
        let _ = writeln!(out, "   Current: {} [{}]", current.display_name, current.group_id);
    }
    if entity.has_flagged_affiliation() {
        let _ = writeln!(out, "   ★ flagged affiliations in history");
    }
    let _ = writeln!(out, "{}", rule);

    if reconstruction.timeline.is_empty() {
        let _ = writeln!(out, "No player corporation history.");
    }

    for row in &reconstruction.timeline {
        let _ = writeln!(
            out,
            "{} {} [{}]  {} → {}",
            marker(table, row.group_id, row.is_flagged, "🏢"),
            row.group_name,
            row.group_id,
            row.period_start,
            row.period_end
        );

        for sg in &row.concurrent_super_groups {
            let _ = writeln!(
                out,
                "      {} {}; {}; {}; {}",
                marker(table, sg.super_group_id, sg.is_flagged, "·"),
                sg.display_name,
                sg.super_group_id,
                sg.period_start,
                sg.period_end
            );
        }
    }

    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out, "{}", reconstruction.summary());
    out
}
