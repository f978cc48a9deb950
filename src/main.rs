use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use liked_songs_exporter::cli_style::{self, get_styles, TableBuilder};
use liked_songs_exporter::config::{
    AppConfig, CliConfig, FileConfig, DEFAULT_ARTIST_LOOKUP_WORKERS, DEFAULT_FEATURE_BATCH_SIZE,
    DEFAULT_PAGE_LIMIT, DEFAULT_REQUEST_TIMEOUT_SEC,
};
use liked_songs_exporter::genres::{rank_genres, GenreFrequency};
use liked_songs_exporter::oauth::{SpotifyOAuth, SPOTIFY_ACCOUNTS_BASE};
use liked_songs_exporter::pipeline::{self, RunReport};
use liked_songs_exporter::snapshot::read_snapshot;
use liked_songs_exporter::spotify::{SpotifyClient, SPOTIFY_API_BASE};

#[derive(Parser, Debug)]
#[command(name = "liked-songs", version, styles = get_styles())]
#[command(about = "Export your saved tracks with genres and audio features to a dated snapshot")]
struct CliArgs {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Authenticate, extract the saved tracks and write today's snapshot (default).
    Export(ExportArgs),
    /// Print the genre ranking stored in an existing snapshot.
    Genres {
        /// Snapshot file written by a previous export.
        snapshot: PathBuf,
        /// Number of genres to show.
        #[clap(long, default_value_t = 20)]
        top: usize,
    },
}

// Also a standalone parser: a bare `liked-songs` exports with defaults and env values.
#[derive(Parser, Debug)]
struct ExportArgs {
    /// Path to a TOML config file. Values in the file override command line values.
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// Application client id.
    #[clap(long, env = "SPOTIFY_CLIENT_ID")]
    pub client_id: Option<String>,

    /// Application client secret.
    #[clap(long, env = "SPOTIFY_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,

    /// Account whose saved tracks are exported.
    #[clap(long, env = "SPOTIFY_USERNAME")]
    pub username: Option<String>,

    /// Redirect URI registered for the application.
    #[clap(long, env = "SPOTIFY_REDIRECT_URI")]
    pub redirect_uri: Option<String>,

    /// Directory where the dated snapshot is written.
    #[clap(long)]
    pub output_dir: Option<PathBuf>,

    /// Saved tracks requested per page.
    #[clap(long, default_value_t = DEFAULT_PAGE_LIMIT)]
    pub page_limit: usize,

    /// Track ids per audio features request.
    #[clap(long, default_value_t = DEFAULT_FEATURE_BATCH_SIZE)]
    pub feature_batch_size: usize,

    /// Timeout for each HTTP request, in seconds.
    #[clap(long, default_value_t = DEFAULT_REQUEST_TIMEOUT_SEC)]
    pub request_timeout_sec: u64,

    /// Concurrent artist genre lookups. 1 looks artists up sequentially.
    #[clap(long, default_value_t = DEFAULT_ARTIST_LOOKUP_WORKERS)]
    pub artist_lookup_workers: usize,

    /// Token cache file. Defaults to `.cache-<username>`.
    #[clap(long)]
    pub token_cache_path: Option<PathBuf>,

    #[clap(long, default_value = SPOTIFY_API_BASE, hide = true)]
    pub api_base_url: String,

    #[clap(long, default_value = SPOTIFY_ACCOUNTS_BASE, hide = true)]
    pub accounts_base_url: String,

    /// Print the run report as JSON instead of the summary.
    #[clap(long)]
    pub json: bool,
}

impl From<&ExportArgs> for CliConfig {
    fn from(args: &ExportArgs) -> Self {
        CliConfig {
            client_id: args.client_id.clone(),
            client_secret: args.client_secret.clone(),
            username: args.username.clone(),
            redirect_uri: args.redirect_uri.clone(),
            output_dir: args.output_dir.clone(),
            page_limit: args.page_limit,
            feature_batch_size: args.feature_batch_size,
            request_timeout_sec: args.request_timeout_sec,
            artist_lookup_workers: args.artist_lookup_workers,
            token_cache_path: args.token_cache_path.clone(),
            api_base_url: args.api_base_url.clone(),
            accounts_base_url: args.accounts_base_url.clone(),
        }
    }
}

fn main() -> ExitCode {
    match try_main() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            cli_style::print_error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

fn try_main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    match cli_args.command {
        Some(Command::Export(args)) => run_export(&args),
        None => run_export(&ExportArgs::parse_from(["liked-songs"])),
        Some(Command::Genres { snapshot, top }) => show_genres(&snapshot, top),
    }
}

fn run_export(args: &ExportArgs) -> Result<()> {
    let file_config = match &args.config {
        Some(path) => {
            info!("Loading config from {:?}", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let config = AppConfig::resolve(&CliConfig::from(args), file_config)?;

    let oauth = SpotifyOAuth::new(
        config.credentials.clone(),
        &config.accounts_base_url,
        config.token_cache_path.clone(),
        config.request_timeout(),
    )?;
    let session = oauth.login(cli_style::prompt_for_redirect)?;

    let client = SpotifyClient::new(&config.api_base_url, &session, config.request_timeout())?;
    let user = client.verify_user(&config.credentials.username)?;
    info!("Exporting saved tracks of {}", user.id);

    let report = pipeline::run(
        &client,
        &config.pipeline_settings(),
        Local::now().date_naive(),
    )?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn show_genres(snapshot: &Path, top: usize) -> Result<()> {
    let rows = read_snapshot(snapshot)?;
    let (_, frequencies) = rank_genres(&rows);

    cli_style::print_section_header("Snapshot");
    cli_style::print_key_value("File", &snapshot.display().to_string());
    cli_style::print_key_value("Tracks", &rows.len().to_string());
    cli_style::print_key_value("Distinct genres", &frequencies.len().to_string());
    cli_style::print_section_footer();

    print_genre_table(&frequencies, top);
    Ok(())
}

fn print_report(report: &RunReport) {
    cli_style::print_section_header("Export summary");
    cli_style::print_key_value("Run date", &report.run_date.format("%Y-%m-%d").to_string());
    cli_style::print_key_value("Saved tracks", &report.reported_total.to_string());
    cli_style::print_key_value("Pages requested", &report.pages_requested.to_string());
    cli_style::print_key_value("Extracted", &report.extracted_tracks.to_string());
    cli_style::print_key_value("Artists looked up", &report.artist_lookups.to_string());
    cli_style::print_key_value("Enriched", &report.enriched_tracks.to_string());
    cli_style::print_section_footer();

    if report.skipped_items > 0 {
        cli_style::print_warning(&format!(
            "{} saved items had no track or artist id and were skipped",
            report.skipped_items
        ));
    }
    if !report.unmatched_track_ids.is_empty() {
        cli_style::print_warning(&format!(
            "{} tracks had no audio features and were left out of the snapshot:",
            report.unmatched_track_ids.len()
        ));
        for id in report.unmatched_track_ids.iter().take(10) {
            cli_style::print_list_item(id, 1);
        }
    }

    print_genre_table(&report.genre_frequencies, 20);
    cli_style::print_success(&format!(
        "Snapshot written to {}",
        report.snapshot_path.display()
    ));
}

fn print_genre_table(frequencies: &[GenreFrequency], top: usize) {
    cli_style::print_section_header("Top genres");
    if frequencies.is_empty() {
        cli_style::print_empty_list("No genres found");
        cli_style::print_section_footer();
        return;
    }

    let mut table = TableBuilder::new(vec!["#", "Genre", "Occurrences"])
        .align_right(0)
        .align_right(2);
    for (rank, frequency) in frequencies.iter().take(top).enumerate() {
        table.add_row(vec![
            (rank + 1).to_string(),
            frequency.genre.clone(),
            frequency.count.to_string(),
        ]);
    }
    table.print();
    if frequencies.len() > top {
        cli_style::print_empty_list(&format!("{} more", frequencies.len() - top));
    }
    println!();
}
