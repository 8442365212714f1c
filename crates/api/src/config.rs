use anyhow::Context;
use std::net::SocketAddr;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_BODY_LIMIT: usize = 2 * 1024 * 1024;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub port: u16,
    pub body_limit: usize,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let port = match get("TIMETABLE__SERVER__PORT") {
            Some(v) => v.parse().with_context(|| format!("invalid TIMETABLE__SERVER__PORT {v:?}"))?,
            None => DEFAULT_PORT,
        };
        let body_limit = match get("TIMETABLE__SERVER__BODY_LIMIT") {
            Some(v) => v
                .parse()
                .with_context(|| format!("invalid TIMETABLE__SERVER__BODY_LIMIT {v:?}"))?,
            None => DEFAULT_BODY_LIMIT,
        };
        Ok(Self { port, body_limit })
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}
