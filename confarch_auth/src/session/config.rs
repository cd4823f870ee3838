/// Cookie name and lifetime of one session scheme
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub cookie_name: String,
    /// Server-side lifetime in seconds. Persistent cookies use it as `Max-Age`.
    pub ttl: u64,
}

impl SessionConfig {
    pub fn new(cookie_name: impl Into<String>, ttl: u64) -> Self {
        Self {
            cookie_name: cookie_name.into(),
            ttl,
        }
    }
}
