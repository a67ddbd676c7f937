use std::path::PathBuf;

use serde::*;
use serde_yaml::{Mapping, Value as YamlValue};

// region: Context
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ContextSpec {
    #[serde(default)]
    pub cluster: String,
    #[serde(default)]
    pub user: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(flatten)]
    pub extra: Mapping,
}

impl ContextSpec {
    pub fn new(cluster: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            cluster: cluster.into(),
            user: user.into(),
            ..Default::default()
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Context {
    pub name: String,
    #[serde(default)]
    pub context: ContextSpec,
}
// endregion

// region: Cluster
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct ClusterSpec {
    #[serde(default)]
    pub server: String,
    #[serde(default, with = "base64_data", skip_serializing_if = "Option::is_none")]
    pub certificate_authority_data: Option<Vec<u8>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_authority: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insecure_skip_tls_verify: Option<YamlValue>,
    #[serde(flatten)]
    pub extra: Mapping,
}

impl ClusterSpec {
    /// CA bytes, with an absent field reading as empty.
    pub fn ca_data(&self) -> &[u8] {
        self.certificate_authority_data.as_deref().unwrap_or_default()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Cluster {
    pub name: String,
    #[serde(default)]
    pub cluster: ClusterSpec,
}
// endregion

// region: User
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct UserSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_certificate: Option<PathBuf>,
    #[serde(default, with = "base64_data", skip_serializing_if = "Option::is_none")]
    pub client_certificate_data: Option<Vec<u8>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_key: Option<PathBuf>,
    #[serde(default, with = "base64_data", skip_serializing_if = "Option::is_none")]
    pub client_key_data: Option<Vec<u8>>,
    #[serde(flatten)]
    pub extra: Mapping,
}

impl UserSpec {
    pub fn token(&self) -> &str {
        self.token.as_deref().unwrap_or_default()
    }

    pub fn client_certificate_data(&self) -> &[u8] {
        self.client_certificate_data.as_deref().unwrap_or_default()
    }

    pub fn client_key_data(&self) -> &[u8] {
        self.client_key_data.as_deref().unwrap_or_default()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct User {
    pub name: String,
    #[serde(default)]
    pub user: UserSpec,
}
// endregion

// region: Common
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ApiVersion {
    #[default]
    #[serde(rename = "v1")]
    V1,
}
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Kind {
    #[default]
    Config,
}

/// A kubeconfig document.
///
/// Clusters, contexts and users keep the order they were declared in, and
/// every key this type does not model lands in `extra` (or the `extra` of the
/// entry it belongs to) so that a load/save round trip keeps it.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct KubeConfig {
    #[serde(default)]
    pub kind: Kind,
    #[serde(rename = "apiVersion", default)]
    pub api_version: ApiVersion,
    #[serde(default)]
    pub preferences: Mapping,
    #[serde(default, deserialize_with = "null_as_default")]
    pub clusters: Vec<Cluster>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub users: Vec<User>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub contexts: Vec<Context>,
    #[serde(default)]
    pub current_context: String,
    #[serde(flatten)]
    pub extra: Mapping,
}

impl KubeConfig {
    /// Parses a kubeconfig document. Blank input is an empty document.
    pub fn from_yaml(text: &str) -> Result<KubeConfig, serde_yaml::Error> {
        if text.trim().is_empty() {
            return Ok(KubeConfig::default());
        }
        serde_yaml::from_str(text)
    }

    /// Like [`KubeConfig::from_yaml`], for raw file contents. Bytes that are
    /// not UTF-8 are an error rather than being replaced.
    pub fn from_slice(raw: &[u8]) -> Result<KubeConfig, serde_yaml::Error> {
        if raw.iter().all(u8::is_ascii_whitespace) {
            return Ok(KubeConfig::default());
        }
        serde_yaml::from_slice(raw)
    }

    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    pub fn cluster(&self, name: &str) -> Option<&ClusterSpec> {
        self.clusters
            .iter()
            .find(|c| c.name == name)
            .map(|c| &c.cluster)
    }

    pub fn cluster_mut(&mut self, name: &str) -> Option<&mut ClusterSpec> {
        self.clusters
            .iter_mut()
            .find(|c| c.name == name)
            .map(|c| &mut c.cluster)
    }

    pub fn context(&self, name: &str) -> Option<&ContextSpec> {
        self.contexts
            .iter()
            .find(|c| c.name == name)
            .map(|c| &c.context)
    }

    pub fn context_mut(&mut self, name: &str) -> Option<&mut ContextSpec> {
        self.contexts
            .iter_mut()
            .find(|c| c.name == name)
            .map(|c| &mut c.context)
    }

    pub fn user(&self, name: &str) -> Option<&UserSpec> {
        self.users.iter().find(|u| u.name == name).map(|u| &u.user)
    }

    pub fn user_mut(&mut self, name: &str) -> Option<&mut UserSpec> {
        self.users
            .iter_mut()
            .find(|u| u.name == name)
            .map(|u| &mut u.user)
    }

    /// Replaces the cluster called `name`, or appends it.
    pub fn insert_cluster(&mut self, name: &str, cluster: ClusterSpec) {
        match self.cluster_mut(name) {
            Some(existing) => *existing = cluster,
            None => self.clusters.push(Cluster {
                name: name.to_owned(),
                cluster,
            }),
        }
    }

    /// Replaces the context called `name`, or appends it.
    pub fn insert_context(&mut self, name: &str, context: ContextSpec) {
        match self.context_mut(name) {
            Some(existing) => *existing = context,
            None => self.contexts.push(Context {
                name: name.to_owned(),
                context,
            }),
        }
    }

    /// Replaces the user called `name`, or appends it.
    pub fn insert_user(&mut self, name: &str, user: UserSpec) {
        match self.user_mut(name) {
            Some(existing) => *existing = user,
            None => self.users.push(User {
                name: name.to_owned(),
                user,
            }),
        }
    }

    pub fn cluster_names(&self) -> impl Iterator<Item = &str> {
        self.clusters.iter().map(|c| c.name.as_str())
    }

    pub fn context_names(&self) -> impl Iterator<Item = &str> {
        self.contexts.iter().map(|c| c.name.as_str())
    }

    pub fn user_names(&self) -> impl Iterator<Item = &str> {
        self.users.iter().map(|u| u.name.as_str())
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    T: Default + Deserialize<'de>,
    D: Deserializer<'de>,
{
    let opt = Option::deserialize(deserializer)?;
    Ok(opt.unwrap_or_default())
}

/// `*-data` fields are base64 on disk and raw bytes in memory.
mod base64_data {
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(v: &Option<Vec<u8>>, s: S) -> Result<S::Ok, S::Error> {
        match v {
            Some(v) => s.serialize_str(&base64::engine::general_purpose::STANDARD.encode(v)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Vec<u8>>, D::Error> {
        match Option::<String>::deserialize(d)? {
            Some(v) => {
                // pasted blobs are often wrapped
                let joined: String = v.split_whitespace().collect();
                base64::engine::general_purpose::STANDARD
                    .decode(joined)
                    .map(Some)
                    .map_err(serde::de::Error::custom)
            }
            None => Ok(None),
        }
    }
}
// endregion

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const CONFIG: &str = r#"
apiVersion: v1
kind: Config
preferences: {}
current-context: dev
clusters:
- name: dev-cluster
  cluster:
    server: https://dev.example:6443
    certificate-authority-data: aGVsbG8=
    proxy-url: http://proxy.example:3128
- name: prod-cluster
  cluster:
    server: https://prod.example:6443
    insecure-skip-tls-verify: true
contexts:
- name: dev
  context:
    cluster: dev-cluster
    user: dev-user
    namespace: team-a
- name: prod
  context:
    cluster: prod-cluster
    user: prod-user
users:
- name: dev-user
  user:
    client-certificate-data: Y2VydA==
    client-key-data: a2V5
- name: prod-user
  user:
    token: tok-old-aaaa
    exec:
      apiVersion: client.authentication.k8s.io/v1beta1
      command: aws
"#;

    #[test]
    fn parses_entries_in_declared_order() {
        let kc = KubeConfig::from_yaml(CONFIG).unwrap();
        assert_eq!(kc.current_context, "dev");
        assert_eq!(
            kc.cluster_names().collect::<Vec<_>>(),
            ["dev-cluster", "prod-cluster"]
        );
        assert_eq!(kc.context_names().collect::<Vec<_>>(), ["dev", "prod"]);
        assert_eq!(kc.user_names().collect::<Vec<_>>(), ["dev-user", "prod-user"]);
        assert_eq!(kc.cluster("dev-cluster").unwrap().ca_data(), b"hello");
        assert_eq!(kc.user("dev-user").unwrap().client_key_data(), b"key");
        assert_eq!(kc.user("prod-user").unwrap().token(), "tok-old-aaaa");
    }

    #[test]
    fn round_trip_keeps_unmodelled_keys() {
        let kc = KubeConfig::from_yaml(CONFIG).unwrap();
        let again = KubeConfig::from_yaml(&kc.to_yaml().unwrap()).unwrap();
        assert_eq!(kc, again);

        let proxy = again.cluster("dev-cluster").unwrap().extra.get(&"proxy-url".into());
        assert_eq!(proxy, Some(&YamlValue::from("http://proxy.example:3128")));
        assert!(again
            .user("prod-user")
            .unwrap()
            .extra
            .contains_key(&"exec".into()));
        assert_eq!(
            again.context("dev").unwrap().namespace.as_deref(),
            Some("team-a")
        );
    }

    #[test]
    fn null_sections_read_as_empty() {
        let kc = KubeConfig::from_yaml("apiVersion: v1\nkind: Config\nclusters: null\nusers:\ncontexts: []\n")
            .unwrap();
        assert!(kc.clusters.is_empty());
        assert!(kc.users.is_empty());
        assert!(kc.contexts.is_empty());
    }

    #[test]
    fn blank_text_is_an_empty_document() {
        assert_eq!(KubeConfig::from_yaml("  \n").unwrap(), KubeConfig::default());
    }

    #[test]
    fn wrapped_base64_is_accepted() {
        let kc = KubeConfig::from_yaml(
            "clusters:\n- name: c\n  cluster:\n    server: s\n    certificate-authority-data: \"aGVs\n      bG8=\"\n",
        )
        .unwrap();
        assert_eq!(kc.cluster("c").unwrap().ca_data(), b"hello");
    }

    #[test]
    fn rejects_wrong_shapes() {
        assert!(KubeConfig::from_yaml("- just\n- a list\n").is_err());
        assert!(KubeConfig::from_yaml("clusters: {oops").is_err());
        assert!(KubeConfig::from_yaml(
            "clusters:\n- name: c\n  cluster:\n    certificate-authority-data: '***'\n"
        )
        .is_err());
    }

    #[test]
    fn insert_replaces_in_place() {
        let mut kc = KubeConfig::from_yaml(CONFIG).unwrap();
        kc.insert_context("dev", ContextSpec::new("other", "someone"));
        kc.insert_context("staging", ContextSpec::new("c", "u"));
        assert_eq!(kc.context_names().collect::<Vec<_>>(), ["dev", "prod", "staging"]);
        assert_eq!(kc.context("dev").unwrap().cluster, "other");
    }
}
