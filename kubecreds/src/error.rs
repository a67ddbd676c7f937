use std::{io, path::PathBuf};

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Everything that can stop a patch run. None of these are retried.
///
/// Messages name the failing step only; the cause is the error source.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Error reading kubeconfig file {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Error getting home directory")]
    HomeDir,

    #[error("Error parsing {what}")]
    Parse {
        what: &'static str,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Error {step}")]
    Prompt {
        step: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("{0}")]
    Resolution(String),

    #[error("Error marshaling config")]
    Marshal(#[source] serde_yaml::Error),

    #[error("Error writing {}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Error writing output")]
    Output(#[source] io::Error),
}

impl Error {
    pub(crate) fn prompt(step: &'static str) -> impl Fn(io::Error) -> Error + Copy {
        move |source| Error::Prompt { step, source }
    }
}
