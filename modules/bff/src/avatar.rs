/// Rewrites object-store avatar links to the gateway's image proxy
///
/// Clients cannot reach the internal object store, so
/// `http://minio:9000/avatars/a.png` becomes
/// `{public_base_url}/v1/proxy/image?key=avatars/a.png`.
#[derive(Debug, Clone)]
pub struct AvatarRewriter {
    internal_prefix: String,
    public_base_url: String,
}

impl AvatarRewriter {
    pub fn new(internal_prefix: impl Into<String>, public_base_url: impl Into<String>) -> Self {
        Self {
            internal_prefix: internal_prefix.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// URLs outside the internal prefix pass through unchanged
    pub fn rewrite(&self, url: &str) -> String {
        match url.strip_prefix(&self.internal_prefix) {
            Some(object_key) if !self.internal_prefix.is_empty() => {
                format!("{}/v1/proxy/image?key={}", self.public_base_url, object_key)
            }
            _ => url.to_string(),
        }
    }
}
