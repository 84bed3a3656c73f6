//! `roadrep` - CLI for roadreport
//!
//! This binary submits violation media for classification and manages the
//! local history of saved reports.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::io::Write;

use anyhow::{bail, Context};
use clap::Parser;

use roadreport::cli::{
    AskCommand, ClearCommand, Cli, Command, ConfigCommand, ListCommand, OutputFormat, ShowCommand,
    StatusCommand, SubmitCommand,
};
use roadreport::error::SUBMISSION_FAILED;
use roadreport::logging::Verbosity;
use roadreport::{
    init_logging, Assistant, Config, HttpClassifier, MediaFile, Report, ReportStore, SqliteBackend,
    SubmissionFlow,
};

type Store = ReportStore<SqliteBackend>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let verbosity = cli.verbosity();

    // Initialize logging based on verbosity
    init_logging(verbosity);

    // Load configuration
    let config = Config::load_from(cli.config.clone()).context("failed to load configuration")?;

    match cli.command {
        Command::Submit(cmd) => {
            let show_progress = !cmd.json && verbosity != Verbosity::Quiet;
            handle_submit(&config, open_store(&config)?, cmd, show_progress).await
        }
        Command::List(cmd) => handle_list(&open_store(&config)?, cmd).await,
        Command::Show(cmd) => handle_show(&open_store(&config)?, &cmd).await,
        Command::Delete(cmd) => {
            let remaining = open_store(&config)?.delete_by_id(&cmd.id).await?;
            println!("{} report(s) remaining.", remaining.len());
            Ok(())
        }
        Command::Clear(cmd) => handle_clear(&open_store(&config)?, &cmd).await,
        Command::Status(cmd) => handle_status(&config, &open_store(&config)?, &cmd).await,
        Command::Ask(cmd) => handle_ask(&config, &cmd).await,
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

fn open_store(config: &Config) -> anyhow::Result<Store> {
    let path = config.database_path();
    let backend = SqliteBackend::open(&path)
        .with_context(|| format!("failed to open report database {}", path.display()))?;
    Ok(ReportStore::with_key(backend, config.storage.backing_key.clone()))
}

async fn handle_submit(
    config: &Config,
    store: Store,
    cmd: SubmitCommand,
    show_progress: bool,
) -> anyhow::Result<()> {
    let classifier = HttpClassifier::from_config(config)?;
    let flow = SubmissionFlow::from_config(classifier, store, config);
    let media = MediaFile::new(cmd.file, cmd.kind.into());

    let progress = flow.start_progress();
    let printer = show_progress.then(|| {
        let mut rx = progress.subscribe();
        tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let value = *rx.borrow_and_update();
                eprint!("\rUploading... {:>3.0}%", value * 100.0);
                let _ = std::io::stderr().flush();
            }
        })
    });

    let result = flow.submit_with_progress(&media, &progress).await;
    drop(progress);
    if let Some(printer) = printer {
        // The channel closes once the progress value is dropped.
        let _ = printer.await;
        eprintln!();
    }

    match result {
        Ok(report) => {
            if cmd.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("Report submitted.");
                println!();
                print_report(&report);
            }
            Ok(())
        }
        Err(e) => bail!("{SUBMISSION_FAILED}: {}", e.user_message()),
    }
}

async fn handle_list(store: &Store, cmd: ListCommand) -> anyhow::Result<()> {
    let mut reports = match cmd.status {
        Some(status) => store.get_by_status(status.into()).await?,
        None => store.get_all().await?,
    };
    if let Some(limit) = cmd.limit {
        reports.truncate(limit);
    }

    match cmd.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&reports)?),
        OutputFormat::Table => {
            println!(
                "{:<22} {:<20} {:<10} {:<24} {:>6}  VIOLATION",
                "ID", "TIMESTAMP", "STATUS", "LOCATION", "CONF"
            );
            for r in &reports {
                println!(
                    "{:<22} {:<20} {:<10} {:<24} {:>6}  {}",
                    r.id,
                    r.timestamp.format("%Y-%m-%d %H:%M:%S"),
                    r.status,
                    truncate(&r.location, 24),
                    r.confidence.map_or_else(|| "-".to_string(), |c| format!("{c:.1}")),
                    r.violation_type
                );
            }
        }
        OutputFormat::Plain => {
            if reports.is_empty() {
                println!("No reports.");
            }
            for r in &reports {
                println!(
                    "{}  {}  [{}]  {} at {}",
                    r.id,
                    r.timestamp.to_rfc3339(),
                    r.status,
                    r.violation_type,
                    r.location
                );
            }
        }
    }
    Ok(())
}

async fn handle_show(store: &Store, cmd: &ShowCommand) -> anyhow::Result<()> {
    let Some(report) = store.get_by_id(&cmd.id).await? else {
        bail!("no report with id {}", cmd.id);
    };
    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

async fn handle_clear(store: &Store, cmd: &ClearCommand) -> anyhow::Result<()> {
    if !cmd.yes {
        println!("This will delete every saved report.");
        println!("Use --yes to confirm.");
        return Ok(());
    }
    store.clear_all().await?;
    println!("All reports cleared.");
    Ok(())
}

async fn handle_status(config: &Config, store: &Store, cmd: &StatusCommand) -> anyhow::Result<()> {
    let stats = store.stats().await?;
    let backend = store.backend();

    if cmd.json {
        let status = serde_json::json!({
            "database_path": backend.path(),
            "database_size_bytes": backend.size_bytes(),
            "backing_key": store.key(),
            "endpoint": config.submission.endpoint,
            "reports": {
                "total": stats.total,
                "submitted": stats.submitted,
                "accepted": stats.accepted,
                "rejected": stats.rejected,
            },
            "oldest": stats.oldest,
            "newest": stats.newest,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("roadrep status");
        println!("--------------");
        println!("Database:      {}", backend.path().display());
        println!("Size:          {} bytes", backend.size_bytes());
        println!("Backing key:   {}", store.key());
        println!("Endpoint:      {}", config.submission.endpoint);
        println!();
        println!("Reports:       {}", stats.total);
        println!("  submitted:   {}", stats.submitted);
        println!("  accepted:    {}", stats.accepted);
        println!("  rejected:    {}", stats.rejected);
        if let (Some(oldest), Some(newest)) = (stats.oldest, stats.newest) {
            println!("Oldest:        {}", oldest.to_rfc3339());
            println!("Newest:        {}", newest.to_rfc3339());
        }
    }
    Ok(())
}

async fn handle_ask(config: &Config, cmd: &AskCommand) -> anyhow::Result<()> {
    let assistant = Assistant::from_config(config)?;
    let answer = assistant
        .ask(&cmd.text())
        .await
        .context("the assistant could not answer right now")?;
    println!("{answer}");
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                let submission = &config.submission;
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
                println!("  Backing key:        {}", config.storage.backing_key);
                println!();
                println!("[Submission]");
                println!("  Endpoint:           {}", submission.endpoint);
                println!("  Timeout (secs):     {}", submission.timeout_secs);
                println!("  Progress interval:  {} ms", submission.progress_interval_ms);
                println!("  Progress step:      {}", submission.progress_step);
                println!("  Progress cap:       {}", submission.progress_cap);
                println!();
                println!("[Defaults]");
                println!("  Location:           {}", submission.defaults.location);
                println!("  Violation type:     {}", submission.defaults.violation_type);
                println!("  Confidence:         {}", submission.defaults.confidence);
                println!("  Status:             {}", submission.defaults.status);
                println!();
                println!("[Assistant]");
                println!("  Endpoint:           {}", config.assistant.endpoint);
                println!("  Model:              {}", config.assistant.model);
                println!(
                    "  API key:            {}",
                    if config.assistant.api_key.is_some() { "set" } else { "not set" }
                );
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => bail!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}

fn print_report(report: &Report) {
    println!("ID:          {}", report.id);
    println!("Timestamp:   {}", report.timestamp.to_rfc3339());
    println!("Location:    {}", report.location);
    println!("Violation:   {}", report.violation_type);
    println!("Status:      {}", report.status);
    if let Some(confidence) = report.confidence {
        println!("Confidence:  {confidence:.1}");
    }
    if let Some(uri) = &report.video_uri {
        println!("Media:       {uri}");
    }
    if let Some(details) = report.details.as_ref().filter(|d| !is_empty_object(d)) {
        println!("Details:     {details}");
    }
}

fn is_empty_object(value: &serde_json::Value) -> bool {
    value.as_object().is_some_and(serde_json::Map::is_empty)
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(width.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}
