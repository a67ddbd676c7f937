pub mod error;
pub mod kubeconfig;
pub mod load;
pub mod lookup;
pub mod merge;
pub mod report;
pub mod run;
pub mod select;
pub mod write;

pub use error::{Error, Result};
pub use kubeconfig::*;
pub use load::{expand_tilde, Loaded, DEFAULT_CONFIG_PATH};
pub use report::ChangeLog;
pub use run::{finish, prepare, Mode, Patch, Settings};
pub use select::{Prompter, Sources, Target};
