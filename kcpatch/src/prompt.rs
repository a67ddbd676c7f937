use std::io;

use dialoguer::{theme::ColorfulTheme, Confirm, Editor, Input, Select};
use kubecreds::Prompter;

/// Asks on the terminal with dialoguer. Pasting happens in `$EDITOR`.
pub struct Terminal {
    theme: ColorfulTheme,
}

impl Terminal {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

impl Prompter for Terminal {
    fn select(&mut self, prompt: &str, items: &[String]) -> io::Result<usize> {
        Select::with_theme(&self.theme)
            .with_prompt(prompt)
            .items(items)
            .default(0)
            .interact()
    }

    fn input(&mut self, prompt: &str) -> io::Result<String> {
        Input::<String>::with_theme(&self.theme)
            .with_prompt(prompt)
            .interact_text()
    }

    fn confirm(&mut self, prompt: &str) -> io::Result<bool> {
        Confirm::with_theme(&self.theme)
            .with_prompt(prompt)
            .default(false)
            .wait_for_newline(true)
            .interact()
    }

    fn paste(&mut self, prompt: &str) -> io::Result<String> {
        eprintln!("{prompt}");
        Editor::new()
            .extension(".yaml")
            .edit(&format!("# {prompt}\n"))?
            .ok_or_else(|| io::Error::new(io::ErrorKind::Interrupted, "editor closed without saving"))
    }
}
