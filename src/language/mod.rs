//! Supported languages and their starter templates.

use std::{fmt, path::Path, str::FromStr};

use anyhow::{anyhow, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Language {
    #[default]
    JavaScript,
    Python,
    Java,
    C,
}

/// Static description of one language as offered in the selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageConfig {
    pub key: Language,
    /// Language/version id the execution service knows this entry by.
    pub engine_id: u32,
    pub display_name: &'static str,
    pub template: &'static str,
}

const JAVA_TEMPLATE: &str = r#"public class Main {
    public static void main(String[] args) {
        System.out.println("Hello, World!");
    }
}"#;

const C_TEMPLATE: &str = r#"#include <stdio.h>

int main() {
    printf("Hello, World!\n");
    return 0;
}"#;

static CONFIGS: [LanguageConfig; 4] = [
    LanguageConfig {
        key: Language::JavaScript,
        engine_id: 63,
        display_name: "JavaScript",
        template: r#"console.log("Hello, World!");"#,
    },
    LanguageConfig {
        key: Language::Python,
        engine_id: 71,
        display_name: "Python",
        template: r#"print("Hello, World!")"#,
    },
    LanguageConfig {
        key: Language::Java,
        engine_id: 62,
        display_name: "Java",
        template: JAVA_TEMPLATE,
    },
    LanguageConfig {
        key: Language::C,
        engine_id: 50,
        display_name: "C",
        template: C_TEMPLATE,
    },
];

impl Language {
    /// All languages in selector order.
    pub const ALL: [Language; 4] = [Language::JavaScript, Language::Python, Language::Java, Language::C];

    pub fn config(self) -> &'static LanguageConfig {
        &CONFIGS[self.index()]
    }

    /// Position in [`Language::ALL`].
    pub fn index(self) -> usize {
        match self {
            Language::JavaScript => 0,
            Language::Python => 1,
            Language::Java => 2,
            Language::C => 3,
        }
    }

    /// Key sent to the execution service as the `language` field.
    pub fn key(self) -> &'static str {
        match self {
            Language::JavaScript => "javascript",
            Language::Python => "python",
            Language::Java => "java",
            Language::C => "c",
        }
    }

    pub fn display_name(self) -> &'static str {
        self.config().display_name
    }

    pub fn template(self) -> &'static str {
        self.config().template
    }

    /// Name of the single file submitted for execution.
    ///
    /// Java requires the public class to live in `Main.java`; everything else
    /// uses `main.<key>`.
    pub fn file_name(self) -> String {
        match self {
            Language::Java => "Main.java".to_string(),
            other => format!("main.{}", other.key()),
        }
    }

    /// Guess the language from a source file extension.
    pub fn from_path(path: &Path) -> Option<Language> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "js" | "mjs" => Some(Language::JavaScript),
            "py" => Some(Language::Python),
            "java" => Some(Language::Java),
            "c" | "h" => Some(Language::C),
            _ => None,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Language {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        Language::ALL
            .into_iter()
            .find(|l| l.key() == wanted)
            .ok_or_else(|| {
                let keys: Vec<&str> = Language::ALL.iter().map(|l| l.key()).collect();
                anyhow!("unknown language '{}' (expected one of: {})", s, keys.join(", "))
            })
    }
}
