//! Copying pasted credentials into the target context's cluster and user.

use tracing::debug;

use crate::report::{shorten, shorten_bytes, ChangeLog};
use crate::select::{Sources, Target};
use crate::{Error, KubeConfig, Result};

/// Updates the cluster and user that `target` points at in `kc` from the
/// pasted entities named by `sources`, returning what changed.
///
/// Entries that do not exist yet are added as copies of the pasted ones.
/// The server URL of an existing cluster only changes when the target asks
/// for it.
pub fn merge(
    kc: &mut KubeConfig,
    pasted: &KubeConfig,
    sources: &Sources,
    target: &Target,
) -> Result<ChangeLog> {
    let target_ctx = kc
        .context(&target.context)
        .ok_or_else(|| Error::Resolution(format!("Context {} not found", target.context)))?;
    let cluster_name = target_ctx.cluster.clone();
    let user_name = target_ctx.user.clone();

    let pasted_cluster = pasted.cluster(&sources.cluster).ok_or_else(|| {
        Error::Resolution(format!("Cluster {} not found in pasted config", sources.cluster))
    })?;
    let pasted_user = pasted.user(&sources.user).ok_or_else(|| {
        Error::Resolution(format!("User {} not found in pasted config", sources.user))
    })?;

    let mut changes = ChangeLog::new();

    // region: Cluster
    match kc.cluster_mut(&cluster_name) {
        Some(existing) => {
            if target.updates_server() && existing.server != pasted_cluster.server {
                changes.push(format!(
                    "Updated cluster {cluster_name:?} server from {} to {}",
                    existing.server, pasted_cluster.server
                ));
                existing.server = pasted_cluster.server.clone();
            }
            if existing.ca_data() != pasted_cluster.ca_data() {
                changes.push(format!(
                    "Updated cluster {cluster_name:?} CA data from {} to {}",
                    shorten_bytes(existing.ca_data()),
                    shorten_bytes(pasted_cluster.ca_data())
                ));
                existing.certificate_authority_data =
                    pasted_cluster.certificate_authority_data.clone();
            }
        }
        None => {
            changes.push(format!(
                "Added cluster {cluster_name:?} with server {} and CA data {}",
                pasted_cluster.server,
                shorten_bytes(pasted_cluster.ca_data())
            ));
            kc.insert_cluster(&cluster_name, pasted_cluster.clone());
        }
    }
    // endregion

    // region: User
    match kc.user_mut(&user_name) {
        Some(existing) => {
            if existing.token() != pasted_user.token() {
                changes.push(format!(
                    "Updated user {user_name:?} token from {} to {}",
                    shorten(existing.token()),
                    shorten(pasted_user.token())
                ));
                existing.token = pasted_user.token.clone();
            }
            if existing.client_certificate_data() != pasted_user.client_certificate_data() {
                changes.push(format!(
                    "Updated user {user_name:?} client cert from {} to {}",
                    shorten_bytes(existing.client_certificate_data()),
                    shorten_bytes(pasted_user.client_certificate_data())
                ));
                existing.client_certificate_data = pasted_user.client_certificate_data.clone();
            }
            if existing.client_key_data() != pasted_user.client_key_data() {
                changes.push(format!(
                    "Updated user {user_name:?} client key from {} to {}",
                    shorten_bytes(existing.client_key_data()),
                    shorten_bytes(pasted_user.client_key_data())
                ));
                existing.client_key_data = pasted_user.client_key_data.clone();
            }
        }
        None => {
            changes.push(format!(
                "Added user {user_name:?} with token {}, client cert {}, and client key {}",
                shorten(pasted_user.token()),
                shorten_bytes(pasted_user.client_certificate_data()),
                shorten_bytes(pasted_user.client_key_data())
            ));
            kc.insert_user(&user_name, pasted_user.clone());
        }
    }
    // endregion

    debug!(changes = changes.len(), context = %target.context, "merged pasted credentials");
    Ok(changes)
}
