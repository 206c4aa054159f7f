use rand::Rng;

use crate::engines::{SearchProvider, BASE_HEADERS};

pub struct UserAgentGenerator {
    user_agents: Vec<String>,
}

impl UserAgentGenerator {
    pub fn new() -> Self {
        let user_agents = vec![
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36".to_string(),
            "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
            "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36".to_string(),
            "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
            "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36".to_string(),
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0".to_string(),
            "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:121.0) Gecko/20100101 Firefox/121.0".to_string(),
        ];

        Self { user_agents }
    }

    pub fn random_user_agent(&self) -> &str {
        let mut rng = rand::thread_rng();
        let index = rng.gen_range(0..self.user_agents.len());
        &self.user_agents[index]
    }

    /// Fixed agent used when randomization is disabled.
    pub fn static_user_agent(&self) -> &str {
        &self.user_agents[0]
    }

    pub fn contains(&self, user_agent: &str) -> bool {
        self.user_agents.iter().any(|ua| ua == user_agent)
    }
}

impl Default for UserAgentGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Externally provisioned proxy endpoints; empty pool means direct only.
#[derive(Debug, Clone, Default)]
pub struct ProxyPool {
    proxies: Vec<String>,
}

impl ProxyPool {
    pub fn new(proxies: Vec<String>) -> Self {
        Self { proxies }
    }

    pub fn is_empty(&self) -> bool {
        self.proxies.is_empty()
    }

    pub fn random_proxy(&self) -> Option<&str> {
        if self.proxies.is_empty() {
            return None;
        }
        let mut rng = rand::thread_rng();
        let index = rng.gen_range(0..self.proxies.len());
        Some(&self.proxies[index])
    }
}

/// One request's worth of identity. Built fresh for every attempt and never
/// reused, so no two requests can be correlated through a shared session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchIdentity {
    pub user_agent: String,
    pub headers: Vec<(String, String)>,
    pub proxy: Option<String>,
}

impl FetchIdentity {
    pub fn for_provider(
        provider: &SearchProvider,
        user_agent: String,
        proxy: Option<String>,
    ) -> Self {
        let mut headers: Vec<(String, String)> = BASE_HEADERS
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        headers.push(("Referer".to_string(), provider.referer.to_string()));

        Self {
            user_agent,
            headers,
            proxy,
        }
    }
}
