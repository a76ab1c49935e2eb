//! Key namespacing

/// Reversible `{prefix}:{key}` namespacing
#[derive(Debug, Clone)]
pub struct KeyCodec {
    /// `{prefix}:` including the separator
    namespace: String,
}

impl KeyCodec {
    pub fn new(prefix: &str) -> Self {
        Self {
            namespace: format!("{}:", prefix),
        }
    }

    /// Prefix a logical key
    pub fn namespace(&self, key: &str) -> String {
        format!("{}{}", self.namespace, key)
    }

    /// Strip the prefix from a stored key
    ///
    /// Keys outside this namespace come back unchanged.
    pub fn denamespace<'a>(&self, key: &'a str) -> &'a str {
        key.strip_prefix(self.namespace.as_str()).unwrap_or(key)
    }

    /// `LIKE` pattern matching every namespaced key starting with `prefix`
    ///
    /// Wildcards in `prefix` are escaped with `\`; use with `ESCAPE '\'`.
    pub fn like_pattern(&self, prefix: &str) -> String {
        let mut pattern = String::with_capacity(self.namespace.len() + prefix.len() + 1);
        for c in self.namespace.chars().chain(prefix.chars()) {
            if matches!(c, '\\' | '%' | '_') {
                pattern.push('\\');
            }
            pattern.push(c);
        }
        pattern.push('%');
        pattern
    }
}
