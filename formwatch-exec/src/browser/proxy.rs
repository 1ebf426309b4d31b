/// SOCKS5 proxies to spread monitoring traffic over. One is picked at random per launch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProxyPool {
    servers: Vec<String>,
}

impl ProxyPool {
    /// Accepts `host:port` or `scheme://host:port`; bare entries become `socks5://host:port`.
    /// Blank entries are dropped.
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let servers = entries
            .into_iter()
            .filter_map(|e| normalize(e.as_ref()))
            .collect();
        Self { servers }
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }

    pub fn servers(&self) -> &[String] {
        &self.servers
    }

    pub fn pick(&self) -> Option<&str> {
        self.pick_with(&mut fastrand::Rng::new())
    }

    pub fn pick_with(&self, rng: &mut fastrand::Rng) -> Option<&str> {
        if self.servers.is_empty() {
            return None;
        }
        Some(self.servers[rng.usize(..self.servers.len())].as_str())
    }
}

fn normalize(entry: &str) -> Option<String> {
    let s = entry.trim();
    if s.is_empty() {
        return None;
    }
    if s.contains("://") {
        Some(s.to_string())
    } else {
        Some(format!("socks5://{s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_and_drops_blanks() {
        let pool = ProxyPool::new(["174.138.61.184:1080", "  ", "socks5://10.0.0.1:1090"]);
        assert_eq!(
            pool.servers(),
            ["socks5://174.138.61.184:1080", "socks5://10.0.0.1:1090"]
        );
    }

    #[test]
    fn picks_from_pool() {
        let pool = ProxyPool::new(["a:1", "b:2"]);
        let mut rng = fastrand::Rng::with_seed(3);
        let picked = pool.pick_with(&mut rng).unwrap();
        assert!(pool.servers().iter().any(|s| s == picked));
        assert_eq!(ProxyPool::default().pick(), None);
    }
}
