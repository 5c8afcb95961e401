use std::io::{BufRead, Write};
use std::path::PathBuf;

use clap::Parser;
use tracing::{info, warn};

use crate::config::{self, ConfigError};
use crate::contract::SearchReport;
use crate::service::SearchService;
use crate::transcript::{self, TranscriptError};
use crate::transport::handle_json;

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("transcript error: {0}")]
    Transcript(#[from] TranscriptError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode report: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Highlight search terms across a chat transcript.
#[derive(Debug, Clone, Parser, PartialEq, Eq)]
#[command(name = "chatfind-core", version)]
pub struct CliOptions {
    /// Config file (TOML). Defaults to the app data dir.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Transcript file or directory of .json/.json5 transcripts.
    #[arg(long)]
    pub transcript: PathBuf,

    /// Term to search for; repeat to run several searches in sequence.
    #[arg(long = "query", short = 'q')]
    pub queries: Vec<String>,

    /// Print reports as JSON lines.
    #[arg(long)]
    pub json: bool,

    /// Read JSON requests from stdin, one per line.
    #[arg(long, conflicts_with = "queries")]
    pub serve: bool,

    /// Log at debug level.
    #[arg(long, short = 'v')]
    pub verbose: bool,
}

pub fn parse_cli_args<I, T>(args: I) -> Result<CliOptions, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    CliOptions::try_parse_from(args)
}

pub fn run_with_options(options: CliOptions) -> Result<(), RuntimeError> {
    let config = config::load(options.config.as_deref())?;
    let level = if options.verbose { "debug" } else { "info" };
    if let Err(error) = crate::logging::init(&config.log_dir, level) {
        eprintln!(
            "[chatfind-core] logging disabled ({}): {error}",
            config.log_dir.display()
        );
    }
    info!(
        config_path = %config.config_path.display(),
        transcript = %options.transcript.display(),
        "startup"
    );

    let doc = transcript::load(&options.transcript)?;
    let mut service = SearchService::new(doc, config.highlight);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    if options.serve {
        let stdin = std::io::stdin();
        serve(&mut service, stdin.lock(), &mut out)?;
        return Ok(());
    }

    if options.queries.is_empty() {
        warn!("no queries given");
        writeln!(out, "[chatfind-core] nothing to do; pass --query or --serve")?;
        return Ok(());
    }

    for query in &options.queries {
        let report = service.report(query);
        if options.json {
            writeln!(out, "{}", serde_json::to_string(&report)?)?;
        } else {
            write_report(&mut out, &report)?;
        }
    }
    Ok(())
}

/// Answers each non-blank request line with one response line.
pub fn serve<R: BufRead, W: Write>(
    service: &mut SearchService,
    input: R,
    out: &mut W,
) -> Result<usize, RuntimeError> {
    let mut handled = 0;
    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        writeln!(out, "{}", handle_json(service, &line))?;
        out.flush()?;
        handled += 1;
    }
    info!(handled, "stdin closed");
    Ok(handled)
}

pub fn write_report<W: Write>(out: &mut W, report: &SearchReport) -> std::io::Result<()> {
    writeln!(
        out,
        "'{}': {} match(es) in {} element(s)",
        report.term,
        report.match_count,
        report.highlighted.len()
    )?;
    for found in &report.matches {
        writeln!(
            out,
            "  container={} element={} [{}..{}] {}",
            found.container, found.element, found.start, found.end, found.excerpt
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{parse_cli_args, serve, write_report};
    use crate::config::HighlightConfig;
    use crate::contract::{MatchDto, SearchReport};
    use crate::document::MemoryDocument;
    use crate::service::SearchService;

    #[test]
    fn parses_repeated_queries() {
        let options = parse_cli_args([
            "chatfind-core",
            "--transcript",
            "chat.json",
            "-q",
            "alpha",
            "--query",
            "beta",
            "--json",
        ])
        .unwrap();
        assert_eq!(options.queries, vec!["alpha", "beta"]);
        assert!(options.json);
        assert!(!options.serve);
    }

    #[test]
    fn transcript_is_required() {
        assert!(parse_cli_args(["chatfind-core", "-q", "alpha"]).is_err());
    }

    #[test]
    fn serve_rejects_queries() {
        let result = parse_cli_args([
            "chatfind-core",
            "--transcript",
            "chat.json",
            "--serve",
            "-q",
            "alpha",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn serve_answers_each_request_line() {
        let mut service = SearchService::new(MemoryDocument::new(), HighlightConfig::default());
        let input = "{\"kind\":\"Snapshot\"}\n\nnot json\n";
        let mut out = Vec::new();

        let handled = serve(&mut service, input.as_bytes(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(handled, 2);
        assert!(lines[0].contains("\"status\":\"ok\""));
        assert!(lines[1].contains("invalid_json"));
    }

    #[test]
    fn report_lists_each_match() {
        let report = SearchReport {
            term: "hi".into(),
            match_count: 1,
            highlighted: vec![3],
            first_highlight: Some(3),
            matches: vec![MatchDto {
                container: 2,
                element: 3,
                segment: 0,
                start: 0,
                end: 2,
                excerpt: "Hi".into(),
            }],
        };
        let mut out = Vec::new();
        write_report(&mut out, &report).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("'hi': 1 match(es) in 1 element(s)"));
        assert!(text.contains("element=3 [0..2] Hi"));
    }
}
