use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(name = "resume-client", version)]
#[command(about = "Analyze a resume with the remote analysis service and export the result")]
pub struct Cli {
    /// Analysis service base URL (overrides RESUME_API_BASE_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Directory for exported artifacts (overrides RESUME_EXPORT_DIR)
    #[arg(long, global = true)]
    pub out_dir: Option<PathBuf>,

    /// Disable ANSI colours in the rendered view
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Analyze a PDF resume or pasted text
    Analyze(AnalyzeArgs),
    /// Fetch and render the service's sample analysis
    Sample(ExportArgs),
    /// Check that the analysis service is reachable
    Ping,
    /// Render or export a previously saved structured dump
    Render {
        /// Path to a `<name>_analysis.json` dump
        dump: PathBuf,
        #[command(flatten)]
        export: ExportArgs,
    },
}

#[derive(Debug, Args)]
#[group(required = true, multiple = false, id = "input")]
pub struct InputArgs {
    /// PDF file to upload
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Resume text to analyze
    #[arg(long)]
    pub text: Option<String>,

    /// Read resume text from standard input
    #[arg(long)]
    pub stdin: bool,
}

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Extract the PDF text locally and send it on the text path
    #[arg(long, requires = "file")]
    pub local_extract: bool,

    /// Keep the submitted text in the result when the service does not echo it
    #[arg(long)]
    pub keep_raw: bool,

    #[command(flatten)]
    pub export: ExportArgs,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Export the result after rendering it
    #[arg(long, value_enum)]
    pub export: Option<ExportFormat>,

    /// Document backend used for `--export pdf|both`
    #[arg(long, value_enum, default_value_t = DocumentBackend::Pdf)]
    pub backend: DocumentBackend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    /// Structured JSON dump
    Json,
    /// Paginated document
    Pdf,
    /// Both artifacts
    Both,
}

impl ExportFormat {
    pub fn wants_dump(self) -> bool {
        matches!(self, ExportFormat::Json | ExportFormat::Both)
    }

    pub fn wants_document(self) -> bool {
        matches!(self, ExportFormat::Pdf | ExportFormat::Both)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DocumentBackend {
    Pdf,
    Text,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_text_analysis_with_export() {
        let cli = Cli::try_parse_from([
            "resume-client",
            "analyze",
            "--text",
            "John Doe, Skills: Python, Go",
            "--export",
            "both",
        ])
        .unwrap();
        let Command::Analyze(args) = cli.command else {
            panic!("expected analyze");
        };
        assert_eq!(args.input.text.as_deref(), Some("John Doe, Skills: Python, Go"));
        assert_eq!(args.export.export, Some(ExportFormat::Both));
        assert_eq!(args.export.backend, DocumentBackend::Pdf);
    }

    #[test]
    fn test_file_and_text_conflict() {
        let parsed = Cli::try_parse_from([
            "resume-client",
            "analyze",
            "--file",
            "cv.pdf",
            "--text",
            "hello",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_analyze_requires_an_input() {
        assert!(Cli::try_parse_from(["resume-client", "analyze"]).is_err());
    }

    #[test]
    fn test_local_extract_requires_file() {
        let parsed =
            Cli::try_parse_from(["resume-client", "analyze", "--text", "x", "--local-extract"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "resume-client",
            "ping",
            "--api-url",
            "http://127.0.0.1:9000",
            "--no-color",
        ])
        .unwrap();
        assert_eq!(cli.api_url.as_deref(), Some("http://127.0.0.1:9000"));
        assert!(cli.no_color);
    }
}
