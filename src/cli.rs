use std::path::PathBuf;

use clap::Parser;

use crate::language::Language;

#[derive(Parser, Debug, Clone)]
#[command(name = "coderun", about = "Edit and run JavaScript, Python, Java and C through the Piston API", version)]
pub struct Cli {
    /// Language to start with (javascript, python, java, c).
    #[arg(short = 'l', long, value_parser = clap::value_parser!(Language))]
    pub language: Option<Language>,

    /// Run FILE once and print its output instead of opening the editor.
    /// Use "-" to read the source from stdin.
    #[arg(long, value_name = "FILE")]
    pub run: Option<PathBuf>,

    /// Execution endpoint (overrides PISTON_API_URL).
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Request timeout in seconds; 0 waits indefinitely (overrides REQUEST_TIMEOUT).
    #[arg(long)]
    pub timeout: Option<u64>,

    /// List supported languages and exit.
    #[arg(long = "list-languages")]
    pub list_languages: bool,

    /// Log filter, e.g. "debug" or "coderun=trace". RUST_LOG takes precedence.
    #[arg(long = "log-level", default_value = "warn")]
    pub log_level: String,

    /// Disable colored output in one-shot mode.
    #[arg(long = "no-color")]
    pub no_color: bool,
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flags() {
        let cli = Cli::try_parse_from(["coderun", "-l", "python", "--run", "a.py", "--timeout", "10"]).unwrap();
        assert_eq!(cli.language, Some(Language::Python));
        assert_eq!(cli.run, Some(PathBuf::from("a.py")));
        assert_eq!(cli.timeout, Some(10));
        assert_eq!(cli.log_level, "warn");
    }

    #[test]
    fn rejects_unknown_language() {
        assert!(Cli::try_parse_from(["coderun", "--language", "ruby"]).is_err());
    }
}
