mod cli;
mod client;
mod config;
mod errors;
mod export;
mod intake;
mod models;
mod render;
mod session;

use std::io::{IsTerminal, Read};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context as _, Result};
use clap::Parser;
use owo_colors::OwoColorize;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::{AnalyzeArgs, Cli, Command, DocumentBackend, ExportArgs};
use crate::client::{AnalysisApi, HttpAnalysisClient};
use crate::config::Config;
use crate::errors::{AppError, Notice, Severity};
use crate::export::{
    artifact_file_name, dump_json, export_document, parse_dump, parse_raw_dump, write_artifact,
    DocumentRenderer, ExportError, ExportSlot, PdfRenderer, TextRenderer, DUMP_EXTENSION,
};
use crate::intake::{PdfFile, Submission};
use crate::models::AnalysisResult;
use crate::render::{render_text, ProfileView};
use crate::session::{Session, SessionOptions, Submitted};

/// Everything a subcommand needs, built once from config and global flags.
struct AppContext {
    api: Arc<dyn AnalysisApi>,
    config: Config,
    exports: ExportSlot,
    color: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let mut config = Config::from_env()?;
    if let Some(url) = &cli.api_url {
        config.api_base_url = url.clone();
    }
    if let Some(dir) = &cli.out_dir {
        config.export_dir = dir.clone();
    }

    // Logs go to stderr so stdout carries only the rendered view.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting resume-client v{}", env!("CARGO_PKG_VERSION"));

    let endpoints = config.endpoints()?;
    info!("Analysis service at {}", config.api_base_url);
    let api = HttpAnalysisClient::new(endpoints).context("Failed to build the HTTP client")?;

    let ctx = AppContext {
        api: Arc::new(api),
        config,
        exports: ExportSlot::default(),
        color: !cli.no_color && std::io::stdout().is_terminal(),
    };

    let outcome = match cli.command {
        Command::Analyze(args) => analyze(&ctx, args).await,
        Command::Sample(export) => sample(&ctx, &export).await,
        Command::Ping => ping(&ctx).await,
        Command::Render { dump, export } => render_dump(&ctx, &dump, &export).await,
    };

    Ok(match outcome {
        Ok(code) => code,
        Err(e) => {
            show_notice(&ctx, &e.to_notice());
            ExitCode::FAILURE
        }
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Subcommands
// ────────────────────────────────────────────────────────────────────────────

async fn analyze(ctx: &AppContext, args: AnalyzeArgs) -> Result<ExitCode, AppError> {
    let (file, text) = read_input(&args)?;
    let mut session = Session::new(SessionOptions {
        keep_raw: args.keep_raw,
    });

    let announce = |_: &Submission| eprintln!("Analyzing…");
    match session.submit(ctx.api.as_ref(), file, text, announce).await? {
        Submitted::Sent => {}
        Submitted::Skipped if session.notice().is_none() => {
            show_notice(
                ctx,
                &Notice::info("EMPTY_INPUT", "Nothing to analyze: provide a PDF file or some text"),
            );
            return Ok(ExitCode::SUCCESS);
        }
        Submitted::Skipped => {}
    }

    show_session(ctx, &mut session, &args.export).await
}

async fn sample(ctx: &AppContext, export: &ExportArgs) -> Result<ExitCode, AppError> {
    let mut session = Session::new(SessionOptions::default());
    let ticket = session.begin()?;
    eprintln!("Fetching sample analysis…");
    let outcome = ctx.api.sample().await;
    session.complete(ticket, outcome);
    show_session(ctx, &mut session, export).await
}

async fn ping(ctx: &AppContext) -> Result<ExitCode, AppError> {
    let message = ctx.api.ping().await?;
    println!("{message}");
    Ok(ExitCode::SUCCESS)
}

/// Renders a saved dump offline. An incomplete dump still renders its
/// recovery panel but cannot be exported.
async fn render_dump(
    ctx: &AppContext,
    path: &Path,
    export: &ExportArgs,
) -> Result<ExitCode, AppError> {
    let text = std::fs::read_to_string(path).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let raw = parse_raw_dump(&text)?;
    println!("{}", render_text(&ProfileView::build(&raw), ctx.color));

    if export.export.is_none() {
        return Ok(if raw.is_well_formed() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        });
    }
    let result = parse_dump(&text)?;
    run_exports(ctx, &result, export).await
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

fn read_input(args: &AnalyzeArgs) -> Result<(Option<PdfFile>, Option<String>), AppError> {
    let input = &args.input;
    if let Some(path) = &input.file {
        let pdf = PdfFile::load(path)?;
        if args.local_extract {
            let text = pdf.extract_text()?;
            info!(
                "Extracted {} characters from {} locally",
                text.chars().count(),
                pdf.file_name()
            );
            return Ok((None, Some(text)));
        }
        return Ok((Some(pdf), None));
    }
    if input.stdin {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read resume text from stdin")?;
        return Ok((None, Some(text)));
    }
    Ok((None, input.text.clone()))
}

/// Shows the session's outcome, either the result view or its notice, then
/// returns the session to intake.
async fn show_session(
    ctx: &AppContext,
    session: &mut Session,
    export: &ExportArgs,
) -> Result<ExitCode, AppError> {
    session.tick(Instant::now());
    if let Some(notice) = session.notice() {
        show_notice(ctx, notice);
        session.dismiss();
        return Ok(ExitCode::FAILURE);
    }
    let code = match session.result() {
        Some(result) => {
            println!("{}", render_text(&ProfileView::from_result(result), ctx.color));
            run_exports(ctx, result, export).await?
        }
        None => ExitCode::FAILURE,
    };
    session.reset();
    Ok(code)
}

/// Runs the requested exports. A failed export is reported and the other
/// export still runs; the rendered result is unaffected either way.
async fn run_exports(
    ctx: &AppContext,
    result: &AnalysisResult,
    export: &ExportArgs,
) -> Result<ExitCode, AppError> {
    let Some(format) = export.export else {
        return Ok(ExitCode::SUCCESS);
    };
    let mut code = ExitCode::SUCCESS;

    if format.wants_dump() {
        if let Err(e) = export_dump(ctx, result) {
            warn!("Structured export failed: {e}");
            show_notice(ctx, &AppError::from(e).to_notice());
            code = ExitCode::FAILURE;
        }
    }

    if format.wants_document() {
        if let Err(e) = export_rendered(ctx, result, export.backend).await {
            warn!("Document export failed: {e}");
            show_notice(ctx, &AppError::from(e).to_notice());
            code = ExitCode::FAILURE;
        }
    }

    Ok(code)
}

fn export_dump(ctx: &AppContext, result: &AnalysisResult) -> Result<(), ExportError> {
    let json = dump_json(result)?;
    let name = artifact_file_name(result.personal_info().name(), DUMP_EXTENSION);
    let path = write_artifact(&ctx.config.export_dir, &name, json.as_bytes())?;
    eprintln!("Saved {}", path.display());
    Ok(())
}

async fn export_rendered(
    ctx: &AppContext,
    result: &AnalysisResult,
    backend: DocumentBackend,
) -> Result<(), ExportError> {
    let guard = ctx.exports.try_acquire()?;
    let renderer: Arc<dyn DocumentRenderer> = match backend {
        DocumentBackend::Pdf => Arc::new(PdfRenderer::new(ctx.config.pdf_font.clone())),
        DocumentBackend::Text => Arc::new(TextRenderer::default()),
    };

    eprintln!("Exporting…");
    let document = export_document(Arc::clone(&renderer), result.clone(), guard).await?;
    let name = artifact_file_name(result.personal_info().name(), renderer.extension());
    let path = write_artifact(&ctx.config.export_dir, &name, &document.bytes)?;
    eprintln!("Saved {} ({} pages)", path.display(), document.page_count);
    Ok(())
}

fn show_notice(ctx: &AppContext, notice: &Notice) {
    match (notice.severity, ctx.color) {
        (Severity::Error, true) => eprintln!("{}", notice.to_string().red()),
        (Severity::Info, true) => eprintln!("{}", notice.to_string().dimmed()),
        _ => eprintln!("{notice}"),
    }
}
