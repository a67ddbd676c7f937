//! Finding the pasted entities that feed a merge.
//!
//! Each lookup either finds its entity by name or hands back the names the
//! operator may pick from instead.

use crate::KubeConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Found(String),
    NeedsSelection(Vec<String>),
}

/// Cluster `name`, or every cluster in the document.
pub fn cluster(kc: &KubeConfig, name: &str) -> Lookup {
    match kc.cluster(name) {
        Some(_) => Lookup::Found(name.to_owned()),
        None => Lookup::NeedsSelection(kc.cluster_names().map(String::from).collect()),
    }
}

/// The first context, in declared order, that points at `cluster`.
///
/// The fallback candidates are the contexts pointing at `cluster`, so a miss
/// always comes back with nothing to choose from.
pub fn context_for_cluster(kc: &KubeConfig, cluster: &str) -> Lookup {
    let mut candidates = kc
        .contexts
        .iter()
        .filter(|ctx| ctx.context.cluster == cluster)
        .map(|ctx| ctx.name.clone());

    match candidates.next() {
        Some(first) => {
            let others = candidates.count();
            if others > 0 {
                tracing::debug!(%cluster, context = %first, others, "several pasted contexts use this cluster, taking the first");
            }
            Lookup::Found(first)
        }
        None => Lookup::NeedsSelection(Vec::new()),
    }
}

/// User `name`, or every user in the document.
pub fn user(kc: &KubeConfig, name: &str) -> Lookup {
    match kc.user(name) {
        Some(_) => Lookup::Found(name.to_owned()),
        None => Lookup::NeedsSelection(kc.user_names().map(String::from).collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pasted() -> KubeConfig {
        KubeConfig::from_yaml(
            r#"
clusters:
- name: a
  cluster: {server: "https://a"}
- name: b
  cluster: {server: "https://b"}
contexts:
- name: second-on-a
  context: {cluster: a, user: ua}
- name: on-b
  context: {cluster: b, user: ub}
- name: third-on-a
  context: {cluster: a, user: ua}
users:
- name: ua
  user: {token: x}
- name: ub
  user: {token: y}
"#,
        )
        .unwrap()
    }

    #[test]
    fn cluster_by_name_or_all_names() {
        let kc = pasted();
        assert_eq!(cluster(&kc, "b"), Lookup::Found("b".into()));
        assert_eq!(
            cluster(&kc, "zzz"),
            Lookup::NeedsSelection(vec!["a".into(), "b".into()])
        );
    }

    #[test]
    fn context_takes_first_declared() {
        let kc = pasted();
        assert_eq!(context_for_cluster(&kc, "a"), Lookup::Found("second-on-a".into()));
        assert_eq!(context_for_cluster(&kc, "b"), Lookup::Found("on-b".into()));
        assert_eq!(context_for_cluster(&kc, "c"), Lookup::NeedsSelection(vec![]));
    }

    #[test]
    fn user_by_name_or_all_names() {
        let kc = pasted();
        assert_eq!(user(&kc, "ua"), Lookup::Found("ua".into()));
        assert_eq!(
            user(&kc, "nobody"),
            Lookup::NeedsSelection(vec!["ua".into(), "ub".into()])
        );
    }

    #[test]
    fn empty_document_offers_nothing() {
        let kc = KubeConfig::default();
        assert_eq!(cluster(&kc, "a"), Lookup::NeedsSelection(vec![]));
        assert_eq!(user(&kc, "a"), Lookup::NeedsSelection(vec![]));
    }
}
