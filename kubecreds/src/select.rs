//! The question-and-answer part of a patch run.
//!
//! Nothing here touches the terminal directly; every question goes through a
//! [`Prompter`], so the flow can be driven by dialoguer in the binary and by a
//! script in tests.

use std::io;

use tabular::{row, Table};
use tracing::{debug, warn};

use crate::lookup::{self, Lookup};
use crate::{load, ContextSpec, Error, KubeConfig, Result};

/// The extra entry offered after the existing contexts.
pub const NEW_CONTEXT: &str = "new context";

pub trait Prompter {
    /// Pick one of `items`, returning its index.
    fn select(&mut self, prompt: &str, items: &[String]) -> io::Result<usize>;
    /// One line of text.
    fn input(&mut self, prompt: &str) -> io::Result<String>;
    fn confirm(&mut self, prompt: &str) -> io::Result<bool>;
    /// Free-form multi-line text, returned verbatim.
    fn paste(&mut self, prompt: &str) -> io::Result<String>;
}

/// The on-disk context that receives the pasted credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub context: String,
    /// Created during this run rather than picked from the file.
    pub created: bool,
    pub update_server: bool,
}

impl Target {
    pub fn existing(context: impl Into<String>, update_server: bool) -> Self {
        Self {
            context: context.into(),
            created: false,
            update_server,
        }
    }

    pub fn created(context: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            created: true,
            update_server: true,
        }
    }

    /// Brand-new contexts always take the pasted server.
    pub fn updates_server(&self) -> bool {
        self.created || self.update_server
    }
}

/// Names of the pasted entities the merge copies from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sources {
    pub cluster: String,
    pub context: String,
    pub user: String,
}

/// Asks which context to patch, creating it in `kc` if the operator wants a
/// new one, and whether its server URL should follow the pasted one.
pub fn choose_target(kc: &mut KubeConfig, prompter: &mut impl Prompter) -> Result<Target> {
    let items = context_items(kc);
    let picked = prompter
        .select("Select a context to update", &items)
        .map_err(Error::prompt("selecting context"))?;

    if let Some(existing) = kc.contexts.get(picked) {
        let name = existing.name.clone();
        let cluster = existing.context.cluster.clone();
        debug!(context = %name, "patching existing context");

        let update_server = prompter
            .confirm(&format!("Update server URL for cluster {cluster}?"))
            .map_err(Error::prompt("getting server update confirmation"))?;
        return Ok(Target::existing(name, update_server));
    }
    if picked != kc.contexts.len() {
        return Err(Error::Resolution(format!(
            "Context selection {picked} is out of range"
        )));
    }

    let details = Error::prompt("getting new context details");
    let name = prompter.input("Enter new context name").map_err(details)?;
    let cluster = prompter.input("Enter new cluster name").map_err(details)?;
    let user = prompter.input("Enter new user name").map_err(details)?;

    if kc.context(&name).is_some() {
        warn!(context = %name, "a context with this name exists and will be replaced");
    }
    if kc.cluster(&cluster).is_some() {
        warn!(%cluster, "cluster already exists, the new context will share and update it");
    }
    if kc.user(&user).is_some() {
        warn!(%user, "user already exists, the new context will share and update it");
    }

    debug!(context = %name, %cluster, %user, "creating context");
    kc.insert_context(&name, ContextSpec::new(cluster, user));
    Ok(Target::created(name))
}

/// Asks for the pasted kubeconfig and parses it.
pub fn read_pasted(prompter: &mut impl Prompter) -> Result<KubeConfig> {
    let text = prompter
        .paste("Paste kubeconfig (save and close the editor when done)")
        .map_err(Error::prompt("reading pasted kubeconfig"))?;
    load::parse(&text, "pasted kubeconfig")
}

/// Works out which pasted cluster, context and user to copy from, asking the
/// operator whenever a lookup by name comes up empty.
///
/// When the target's cluster is not in the pasted file, the operator's pick
/// also becomes the target context's cluster in `kc`.
pub fn resolve_sources(
    kc: &mut KubeConfig,
    target: &Target,
    pasted: &KubeConfig,
    prompter: &mut impl Prompter,
) -> Result<Sources> {
    let target_ctx = kc
        .context_mut(&target.context)
        .ok_or_else(|| Error::Resolution(format!("Context {} not found", target.context)))?;

    let cluster = settle(
        lookup::cluster(pasted, &target_ctx.cluster),
        prompter,
        "Select cluster from pasted config",
        "selecting cluster",
        || "Pasted kubeconfig has no clusters".to_owned(),
    )?;
    if cluster != target_ctx.cluster {
        debug!(from = %target_ctx.cluster, to = %cluster, "pointing target context at pasted cluster");
        target_ctx.cluster = cluster.clone();
    }

    let context = settle(
        lookup::context_for_cluster(pasted, &cluster),
        prompter,
        "Select context from pasted config",
        "selecting context",
        || format!("No contexts for cluster {cluster} in pasted config"),
    )?;

    let user_ref = pasted
        .context(&context)
        .map(|ctx| ctx.user.as_str())
        .unwrap_or_default();
    let user = settle(
        lookup::user(pasted, user_ref),
        prompter,
        "Select user from pasted config",
        "selecting user",
        || "Pasted kubeconfig has no users".to_owned(),
    )?;

    debug!(%cluster, %context, %user, "resolved pasted entities");
    Ok(Sources {
        cluster,
        context,
        user,
    })
}

fn settle(
    lookup: Lookup,
    prompter: &mut impl Prompter,
    title: &str,
    step: &'static str,
    nothing_to_pick: impl FnOnce() -> String,
) -> Result<String> {
    let mut candidates = match lookup {
        Lookup::Found(name) => return Ok(name),
        Lookup::NeedsSelection(candidates) => candidates,
    };
    if candidates.is_empty() {
        return Err(Error::Resolution(nothing_to_pick()));
    }

    let picked = prompter
        .select(title, &candidates)
        .map_err(Error::prompt(step))?;
    if picked >= candidates.len() {
        return Err(Error::Resolution(format!("Selection {picked} is out of range")));
    }
    Ok(candidates.swap_remove(picked))
}

/// One aligned row per context, then [`NEW_CONTEXT`].
fn context_items(kc: &KubeConfig) -> Vec<String> {
    let mut table = Table::new("{:<}  {:<}  {:<}");
    for ctx in &kc.contexts {
        let cluster = &ctx.context.cluster;
        let user = &ctx.context.user;
        table.add_row(row!(&ctx.name, format!("🖥  {cluster}"), format!("🧑 {user}")));
    }

    let mut items: Vec<String> = table
        .to_string()
        .lines()
        .map(|line| line.trim_end().to_owned())
        .collect();
    items.push(NEW_CONTEXT.to_owned());
    items
}
