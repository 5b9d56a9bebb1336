use rustyline::error::ReadlineError;

use crate::completer::TutorHelper;
use crate::config::TutorConfig;
use crate::format::render;
use tutor_engine::{Tutor, EXAMPLE_PROBLEMS};

/// What the loop should do after a line was handled.
#[derive(Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Repl {
    config: TutorConfig,
    tutor: Tutor,
}

impl Repl {
    pub fn new(config: TutorConfig) -> Self {
        let tutor = Tutor::new().with_options(config.solve_options());
        Self { config, tutor }
    }

    pub fn run(&mut self) -> rustyline::Result<()> {
        println!("Tutor Matematika Langkah demi Langkah");
        println!("Ketik soal (mis. '2x + 5 = 13'), 'help' untuk bantuan, 'quit' untuk keluar.");

        let config = rustyline::Config::builder()
            .max_history_size(100)?
            .completion_type(rustyline::CompletionType::List)
            .build();
        let mut rl =
            rustyline::Editor::<TutorHelper, rustyline::history::DefaultHistory>::with_config(
                config,
            )?;
        rl.set_helper(Some(TutorHelper::new()));

        let history_path = dirs::home_dir()
            .map(|p| p.join(".tutor_history"))
            .unwrap_or_else(|| std::path::PathBuf::from(".tutor_history"));
        if let Err(e) = rl.load_history(&history_path) {
            tracing::debug!(error = %e, "no history loaded");
        }

        loop {
            match rl.readline("tutor> ") {
                Ok(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    rl.add_history_entry(line)?;
                    let (output, flow) = self.handle_line(line);
                    if !output.is_empty() {
                        println!("{}", output);
                    }
                    if flow == Flow::Quit {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                    println!("Sampai jumpa!");
                    break;
                }
                Err(err) => {
                    eprintln!("Error: {:?}", err);
                    break;
                }
            }
        }

        if let Err(e) = rl.save_history(&history_path) {
            tracing::warn!(path = %history_path.display(), error = %e, "cannot save history");
        }
        Ok(())
    }

    /// Handles one input line, returning the text to print.
    pub fn handle_line(&mut self, line: &str) -> (String, Flow) {
        match line {
            "quit" | "exit" => ("Sampai jumpa!".to_string(), Flow::Quit),
            "help" => (help_text(), Flow::Continue),
            "examples" => (examples_text(), Flow::Continue),
            "steps on" | "steps off" => {
                self.config.show_steps = line == "steps on";
                let state = if self.config.show_steps { "aktif" } else { "nonaktif" };
                (format!("Tampilan langkah {}.", state), Flow::Continue)
            }
            "config save" => match self.config.save() {
                Ok(()) => (
                    format!("Konfigurasi disimpan ke {}.", TutorConfig::path().display()),
                    Flow::Continue,
                ),
                Err(e) => (format!("Gagal menyimpan konfigurasi: {}", e), Flow::Continue),
            },
            "config restore" => match TutorConfig::restore() {
                Ok(config) => {
                    *self = Self::new(config);
                    ("Konfigurasi dikembalikan ke bawaan.".to_string(), Flow::Continue)
                }
                Err(e) => (format!("Gagal memulihkan konfigurasi: {}", e), Flow::Continue),
            },
            problem => {
                let solution = self.tutor.solve(problem, None);
                (render(&solution, self.config.show_steps), Flow::Continue)
            }
        }
    }
}

pub fn help_text() -> String {
    [
        "Perintah:",
        "  <soal>            Selesaikan soal langkah demi langkah",
        "  examples          Tampilkan contoh soal",
        "  steps on|off      Tampilkan atau sembunyikan langkah",
        "  config save       Simpan konfigurasi ke tutor_config.toml",
        "  config restore    Kembalikan konfigurasi bawaan",
        "  quit | exit       Keluar",
    ]
    .join("\n")
}

pub fn examples_text() -> String {
    EXAMPLE_PROBLEMS
        .iter()
        .map(|(category, problems)| {
            let lines: Vec<String> = problems.iter().map(|p| format!("  {}", p)).collect();
            format!("[{}]\n{}", category, lines.join("\n"))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solves_and_toggles_steps() {
        let mut repl = Repl::new(TutorConfig::default());
        let (out, flow) = repl.handle_line("2x + 5 = 13");
        assert_eq!(flow, Flow::Continue);
        assert!(out.contains("Langkah:"));
        assert!(out.ends_with("Jawaban: x = 4"));

        repl.handle_line("steps off");
        let (out, _) = repl.handle_line("2x + 5 = 13");
        assert!(!out.contains("Langkah:"));
    }

    #[test]
    fn commands() {
        let mut repl = Repl::new(TutorConfig::default());
        assert_eq!(repl.handle_line("quit").1, Flow::Quit);
        assert!(repl.handle_line("examples").0.contains("[physics]"));
        assert!(repl.handle_line("help").0.contains("steps on|off"));
    }
}
