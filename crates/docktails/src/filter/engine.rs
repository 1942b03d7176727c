use crate::docker::inventory::ContainerInfo;

/// Selects containers by name prefix.
///
/// Docker reports raw names with a leading `/` (`/web-1`), so the filter
/// `web` matches when `/web` is a prefix of any raw name. Plain prefix
/// matching only: no globs, no regex.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamePrefixFilter {
    prefix: String,
    needle: String,
}

impl NamePrefixFilter {
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            needle: format!("/{}", prefix),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn is_empty(&self) -> bool {
        self.prefix.is_empty()
    }

    /// Match a single raw name as reported by the daemon.
    #[inline]
    pub fn matches(&self, raw_name: &str) -> bool {
        self.is_empty() || raw_name.starts_with(&self.needle)
    }

    /// Match if any of the container's raw names match.
    pub fn matches_container(&self, container: &ContainerInfo) -> bool {
        self.is_empty() || container.names.iter().any(|n| self.matches(n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn container(names: &[&str]) -> ContainerInfo {
        ContainerInfo {
            id: "abc123".to_string(),
            name: names.first().map(|n| n.trim_start_matches('/')).unwrap_or("unknown").to_string(),
            names: names.iter().map(|n| n.to_string()).collect(),
            image: "nginx:latest".to_string(),
            state: "running".to_string(),
            running: true,
            tty: false,
        }
    }

    #[test]
    fn test_prefix_matches_name() {
        let filter = NamePrefixFilter::new("web");
        assert!(filter.matches("/web-1"));
        assert!(filter.matches("/web"));
    }

    #[test]
    fn test_prefix_rejects_other_name() {
        let filter = NamePrefixFilter::new("api");
        assert!(!filter.matches("/web-1"));
    }

    #[test]
    fn test_prefix_is_anchored() {
        let filter = NamePrefixFilter::new("web");
        assert!(!filter.matches("/my-web"), "Prefix must anchor at the start of the name");
        assert!(!filter.matches("web-1"), "Raw names carry a leading slash");
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let filter = NamePrefixFilter::new("");
        for name in ["/web-1", "/api", "", "no-slash"] {
            assert!(filter.matches(name), "empty filter should match {:?}", name);
        }
        assert!(filter.matches_container(&container(&[])));
    }

    #[test]
    fn test_no_regex_semantics() {
        let filter = NamePrefixFilter::new("web.*");
        assert!(!filter.matches("/web-1"));
        assert!(filter.matches("/web.*-literal"));
    }

    #[test]
    fn test_matches_container_any_name() {
        let filter = NamePrefixFilter::new("proxy");
        assert!(filter.matches_container(&container(&["/api", "/proxy/api"])));
        assert!(!filter.matches_container(&container(&["/api"])));
        assert!(!filter.matches_container(&container(&[])));
    }
}
