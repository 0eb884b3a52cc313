//! tachimeta CLI - AniList to Tachiyomi metadata exporter.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tachimeta::analytics;
use tachimeta::anilist::{AnilistClient, CatalogSource};
use tachimeta::config::Config;
use tachimeta::console::Console;
use tachimeta::export::Exporter;
use tachimeta::settings::{FileStore, Settings};

/// Look up manga on AniList and write Tachiyomi details.json files.
#[derive(Parser, Debug)]
#[command(name = "tachimeta")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search AniList for manga.
    Search {
        /// Search terms.
        query: String,

        /// Result page (1-based).
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        page: u32,

        /// Results per page (1-50). Defaults to the configured value.
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=50))]
        per_page: Option<u32>,
    },

    /// Write details.json for one or more AniList ids.
    Export {
        /// AniList media ids.
        #[arg(required = true)]
        ids: Vec<u64>,

        /// Directory to create series folders in.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Show or change preferences.
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },

    /// Print the analytics bootstrap snippet for a host.
    AnalyticsSnippet {
        /// Hostname the page is served from.
        #[arg(long)]
        hostname: String,
    },
}

#[derive(Subcommand, Debug)]
enum SettingsAction {
    /// Print current preferences.
    Show,

    /// Prefer English titles over romanized ones.
    SetEnglishTitle {
        #[arg(action = clap::ArgAction::Set)]
        enabled: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let console = Console::new();

    let config = Config::load().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    let settings_path = config.settings_path()?;
    let mut settings = Settings::open(&settings_path)
        .with_context(|| format!("Failed to open settings at {}", settings_path.display()))?;

    match args.command {
        Command::Search {
            query,
            page,
            per_page,
        } => {
            let per_page = per_page.unwrap_or(config.anilist.per_page);
            run_search(&console, &config, &settings, &query, page, per_page).await
        }
        Command::Export { ids, output } => {
            let output = output.unwrap_or_else(|| config.paths.output_directory.clone());
            run_export(&console, &config, &settings, &ids, output).await
        }
        Command::Settings { action } => run_settings(&console, &mut settings, action),
        Command::AnalyticsSnippet { hostname } => {
            run_analytics_snippet(&console, &config, &hostname);
            Ok(())
        }
    }
}

async fn run_search(
    console: &Console,
    config: &Config,
    settings: &Settings<FileStore>,
    query: &str,
    page: u32,
    per_page: u32,
) -> Result<()> {
    let client = AnilistClient::new(config.anilist.clone())?;

    console.step(&format!("Searching {} for \"{}\"...", client.name(), query));
    let results = client
        .search(query, page, per_page)
        .await
        .context("Search failed")?;

    let media = results.media();
    if media.is_empty() {
        console.warning("No matches");
        return Ok(());
    }

    let prefer_english = settings.use_english_title();
    for entry in media {
        println!("{}", console.media_row(entry, prefer_english));
    }

    if let Some(next) = results.next_page(page) {
        console.info(&format!("More results: --page {}", next));
    }

    Ok(())
}

async fn run_export(
    console: &Console,
    config: &Config,
    settings: &Settings<FileStore>,
    ids: &[u64],
    output: PathBuf,
) -> Result<()> {
    let client = AnilistClient::new(config.anilist.clone())?;
    let exporter = Exporter::new(&client, output, settings.use_english_title());

    console.section("Exporting Tachiyomi metadata");

    let mut failed = 0usize;
    for (id, result) in exporter.export_all(ids).await {
        match result {
            Ok(series) => console.success(&series.summary()),
            Err(e) => {
                failed += 1;
                console.error(&format!("{}: {}", id, e));
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{} of {} exports failed", failed, ids.len());
    }
    Ok(())
}

fn run_settings(
    console: &Console,
    settings: &mut Settings<FileStore>,
    action: SettingsAction,
) -> Result<()> {
    match action {
        SettingsAction::Show => {
            console.section("Settings");
            console.field("file", &settings.store().filepath().display().to_string());
            console.field(
                "use_english_title",
                &settings.use_english_title().to_string(),
            );
        }
        SettingsAction::SetEnglishTitle { enabled } => {
            settings
                .set_use_english_title(enabled)
                .context("Failed to save setting")?;
            console.success(&format!("use_english_title = {}", enabled));
        }
    }
    Ok(())
}

fn run_analytics_snippet(console: &Console, config: &Config, hostname: &str) {
    match analytics::plan(&config.analytics_config(hostname)) {
        Some(bootstrap) => {
            if !bootstrap.tracking_enabled() {
                console.info("Serving from localhost: the script loads but sends nothing");
            }
            print!("{}", bootstrap.render_snippet());
        }
        None => console.warning("Analytics disabled: no analytics id configured"),
    }
}
