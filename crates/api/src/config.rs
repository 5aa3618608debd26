use anyhow::Context;

const PREFIX: &str = "TIMETABLE__";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub body_limit: usize,
    /// Applied to solve requests that carry no `timeLimitMs` of their own.
    pub default_time_limit_ms: Option<u64>,
    /// Finished jobs retained for polling before the oldest are dropped.
    pub keep_finished_jobs: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            body_limit: 2 * 1024 * 1024,
            default_time_limit_ms: Some(30_000),
            keep_finished_jobs: jobs::DEFAULT_KEEP_FINISHED,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut cfg = Self::default();
        let get = |name: &str| lookup(&format!("{PREFIX}{name}"));

        if let Some(v) = get("SERVER__PORT") {
            cfg.port = v.parse().with_context(|| format!("bad SERVER__PORT {v:?}"))?;
        }
        if let Some(v) = get("SERVER__BODY_LIMIT") {
            cfg.body_limit = v
                .parse()
                .with_context(|| format!("bad SERVER__BODY_LIMIT {v:?}"))?;
        }
        if let Some(v) = get("SOLVER__TIME_LIMIT_MS") {
            // 0 disables the default budget
            let ms: u64 = v
                .parse()
                .with_context(|| format!("bad SOLVER__TIME_LIMIT_MS {v:?}"))?;
            cfg.default_time_limit_ms = (ms > 0).then_some(ms);
        }
        if let Some(v) = get("JOBS__KEEP_FINISHED") {
            cfg.keep_finished_jobs = v
                .parse()
                .with_context(|| format!("bad JOBS__KEEP_FINISHED {v:?}"))?;
        }
        Ok(cfg)
    }
}
