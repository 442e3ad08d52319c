//! Plain terminal output for one-shot runs.

use std::io::{self, Write};

use owo_colors::OwoColorize;

use crate::{execution::Outcome, language::Language};

pub struct TextPrinter {
    pub color: bool,
}

impl TextPrinter {
    /// Program output goes to `out` untouched; the notification goes to `err`.
    pub fn write_outcome(&self, out: &mut dyn Write, err: &mut dyn Write, outcome: &Outcome) -> io::Result<()> {
        out.write_all(outcome.output.as_bytes())?;
        if !outcome.output.ends_with('\n') {
            writeln!(out)?;
        }
        out.flush()?;

        let msg = outcome.signal.message();
        if !self.color {
            writeln!(err, "{}", msg)
        } else if outcome.signal.is_success() {
            writeln!(err, "{}", msg.green())
        } else {
            writeln!(err, "{}", msg.red())
        }
    }

    pub fn print_languages(&self) {
        for lang in Language::ALL {
            let cfg = lang.config();
            if self.color {
                println!("{:<12} {:<12} {}", cfg.key.key().cyan(), cfg.display_name, cfg.engine_id);
            } else {
                println!("{:<12} {:<12} {}", cfg.key.key(), cfg.display_name, cfg.engine_id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::{Failure, Signal};

    fn written(printer: &TextPrinter, outcome: &Outcome) -> (String, String) {
        let (mut out, mut err) = (Vec::new(), Vec::new());
        printer.write_outcome(&mut out, &mut err, outcome).unwrap();
        (String::from_utf8(out).unwrap(), String::from_utf8(err).unwrap())
    }

    #[test]
    fn output_and_notification_split_streams() {
        let printer = TextPrinter { color: false };
        let (out, err) = written(&printer, &Outcome { output: "Hello, World!\n".into(), signal: Signal::Success });
        assert_eq!(out, "Hello, World!\n");
        assert_eq!(err, "Code executed successfully!\n");

        let (out, err) = written(
            &printer,
            &Outcome { output: "Error: Unable to execute code".into(), signal: Signal::Failure(Failure::Remote) },
        );
        assert_eq!(out, "Error: Unable to execute code\n");
        assert_eq!(err, "Execution failed\n");
    }

    #[test]
    fn colored_notification_keeps_output_plain() {
        let printer = TextPrinter { color: true };
        let (out, err) = written(&printer, &Outcome { output: "NameError: x".into(), signal: Signal::CompletedWithErrors });
        assert_eq!(out, "NameError: x\n");
        assert!(err.contains("Execution completed with errors"));
        assert!(err.starts_with("\u{1b}["), "Got: {:?}", err);
    }
}
