//! One patch run from start to finish.

use std::{fs, io, path::PathBuf};

use console::style;

use crate::load::{self, Loaded};
use crate::report::ChangeLog;
use crate::select::{self, Prompter};
use crate::write::{self, Written};
use crate::{merge, Error, KubeConfig, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Print the result, write nothing.
    Try { diff: bool },
    /// Back up the file and overwrite it.
    Apply,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Already tilde-expanded.
    pub config_path: PathBuf,
    pub mode: Mode,
    /// Read the pasted kubeconfig from here instead of asking for it.
    pub pasted_from: Option<PathBuf>,
}

/// A merged document that has not been written anywhere yet.
#[derive(Debug, Clone)]
pub struct Patch {
    pub loaded: Loaded,
    pub config: KubeConfig,
    pub changes: ChangeLog,
}

/// Loads the kubeconfig, asks every question and merges. Nothing is written.
pub fn prepare(settings: &Settings, prompter: &mut impl Prompter) -> Result<Patch> {
    let loaded = Loaded::read(&settings.config_path)?;
    let mut config = loaded.config.clone();

    let target = select::choose_target(&mut config, prompter)?;
    let pasted = match &settings.pasted_from {
        Some(path) => {
            let text = fs::read_to_string(path).map_err(|source| Error::Read {
                path: path.clone(),
                source,
            })?;
            load::parse(&text, "pasted kubeconfig")?
        }
        None => select::read_pasted(prompter)?,
    };
    let sources = select::resolve_sources(&mut config, &target, &pasted, prompter)?;
    let changes = merge::merge(&mut config, &pasted, &sources, &target)?;

    Ok(Patch {
        loaded,
        config,
        changes,
    })
}

impl Patch {
    pub fn render(&self) -> Result<String> {
        write::render(&self.config)
    }

    pub fn write(&self) -> Result<Written> {
        write::apply(&self.loaded.path, &self.loaded.raw, &self.config)
    }
}

/// Reports the changes on `out`, then either prints the result or writes it,
/// depending on the mode.
pub fn finish(settings: &Settings, patch: &Patch, out: &mut impl io::Write) -> Result<Option<Written>> {
    write!(out, "{}", patch.changes).map_err(Error::Output)?;

    match settings.mode {
        Mode::Try { diff } => {
            let rendered = patch.render()?;
            writeln!(out, "\n---- Updated kubeconfig (try mode) ----").map_err(Error::Output)?;
            writeln!(out, "{rendered}").map_err(Error::Output)?;
            if diff {
                let unified = write::diff(&patch.loaded.path, &patch.loaded.raw, &rendered);
                writeln!(out, "---- Diff ----").map_err(Error::Output)?;
                for line in unified.lines() {
                    let line = match line.chars().next() {
                        Some('+') => style(line).green(),
                        Some('-') => style(line).red(),
                        Some('@') => style(line).cyan(),
                        _ => style(line),
                    };
                    writeln!(out, "{line}").map_err(Error::Output)?;
                }
            }
            Ok(None)
        }
        Mode::Apply => {
            let written = patch.write()?;
            writeln!(out, "Backup saved to {}", written.backup.display()).map_err(Error::Output)?;
            writeln!(out, "Successfully updated {}", written.config.display())
                .map_err(Error::Output)?;
            Ok(Some(written))
        }
    }
}
