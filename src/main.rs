mod cli;
mod config;
mod editor;
mod execution;
mod language;
mod piston;
mod printer;
mod tui;

use std::{
    fs::{self, OpenOptions},
    io::{self, Read, Write},
    path::Path,
};

use anyhow::{anyhow, Context, Result};
use config::Config;
use editor::EditorState;
use is_terminal::IsTerminal;
use language::Language;
use log::{debug, LevelFilter};
use piston::PistonClient;
use printer::TextPrinter;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    // Load config; CLI flags override it
    let mut cfg = Config::load();
    if let Some(endpoint) = &args.endpoint {
        cfg.set("PISTON_API_URL", endpoint.as_str());
    }
    if let Some(secs) = args.timeout {
        cfg.set("REQUEST_TIMEOUT", secs.to_string());
    }

    let printer = TextPrinter { color: !args.no_color && io::stdout().is_terminal() };
    if args.list_languages {
        printer.print_languages();
        return Ok(());
    }

    // Piped source without --run means "run stdin"
    let run_target = match args.run.clone() {
        Some(path) => Some(path),
        None if !io::stdin().is_terminal() => Some("-".into()),
        None => None,
    };

    let interactive = run_target.is_none();
    init_logging(&cfg, &args.log_level, interactive)?;
    debug!("config: {}", cfg.config_path.display());

    let client = PistonClient::from_config(&cfg)?;

    match run_target {
        Some(path) => {
            let (language, source) = read_submission(&path, args.language, &cfg, &mut io::stdin())?;
            let code = run_once(&client, language, source, &printer, &mut io::stdout(), &mut io::stderr()).await?;
            std::process::exit(code);
        }
        None => {
            let language = match args.language {
                Some(l) => l,
                None => cfg.default_language()?,
            };
            tui::run_tui(client, language, cfg.notification_duration()).await
        }
    }
}

/// Interactive logs go to a file so they never draw over the UI.
fn init_logging(cfg: &Config, level: &str, interactive: bool) -> Result<()> {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(LevelFilter::Warn).parse_filters(level).parse_default_env();

    if interactive {
        let path = cfg.log_file();
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
        }
        let log_file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("opening log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(log_file)));
    }

    builder.init();
    Ok(())
}

/// `-` reads from `stdin` and falls back to the configured default language.
fn read_submission(
    path: &Path,
    language: Option<Language>,
    cfg: &Config,
    stdin: &mut dyn Read,
) -> Result<(Language, String)> {
    let from_stdin = path.as_os_str() == "-";
    let source = if from_stdin {
        let mut buf = String::new();
        stdin.read_to_string(&mut buf).context("reading source from stdin")?;
        buf
    } else {
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?
    };

    let language = match language {
        Some(l) => l,
        None if from_stdin => cfg.default_language()?,
        None => Language::from_path(path).ok_or_else(|| {
            anyhow!("cannot tell the language of {}; pass --language", path.display())
        })?,
    };
    Ok((language, source))
}

/// Execute once through the same state machine the editor uses. Returns the exit code.
async fn run_once(
    client: &PistonClient,
    language: Language,
    source: String,
    printer: &TextPrinter,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<i32> {
    let mut state = EditorState::new(language);
    state.edit_source(source);

    let submission = state.begin_execution();
    let outcome = execution::run(client, &submission).await;
    let signal = state.settle(outcome.clone());

    printer.write_outcome(out, err, &outcome)?;
    Ok(signal.exit_code())
}
