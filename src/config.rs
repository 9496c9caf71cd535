use std::env::VarError;

use crate::core::ingest::available_workers;
use crate::core::types::{DEFAULT_NO_DROP_PATTERN, ExemptionPolicy, Namespace};

/// Settings for one monitor run, read once at process start.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Cluster base URL (`ES_URL`), with `$VAR` / `${VAR}` references expanded.
    pub es_url: String,

    /// Environment label shown in report headings and the mail subject (`BRANCH`).
    pub branch: String,

    /// Report recipients (`RECIPIENTS`, comma-separated). May be empty for dry runs.
    pub recipients: Vec<String>,

    /// Actual-side names matching this are never proposed for deletion (`NO_DROP_PATTERN`).
    pub exemption: ExemptionPolicy,

    /// Concurrent fixture parsers (`WORKERS`). Default: available parallelism.
    pub workers: usize,

    /// Host used in the mail `From:` header (`MONITOR_HOSTNAME`, then `HOSTNAME`).
    pub hostname: String,

    pub namespace: Namespace,
}

impl MonitorConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_reader(|key| std::env::var(key))
    }

    /// Load configuration from a custom variable reader, so tests never touch
    /// the process environment.
    pub fn from_reader<F>(reader: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Result<String, VarError>,
    {
        let required = |key: &str| match reader(key) {
            Ok(v) if !v.trim().is_empty() => Ok(v),
            _ => Err(ConfigError::MissingVar(key.into())),
        };

        let es_url = expand_vars(&required("ES_URL")?, &reader);
        let branch = required("BRANCH")?;

        let recipients: Vec<String> = reader("RECIPIENTS")
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|r| !r.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        let pattern =
            reader("NO_DROP_PATTERN").unwrap_or_else(|_| DEFAULT_NO_DROP_PATTERN.to_string());
        let exemption = ExemptionPolicy::new(&pattern)
            .map_err(|e| ConfigError::InvalidValue("NO_DROP_PATTERN".into(), e.to_string()))?;

        let workers = match reader("WORKERS") {
            Ok(v) => match v.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                Ok(_) => {
                    return Err(ConfigError::InvalidValue(
                        "WORKERS".into(),
                        "must be at least 1".into(),
                    ));
                }
                Err(e) => return Err(ConfigError::InvalidValue("WORKERS".into(), e.to_string())),
            },
            Err(_) => available_workers(),
        };

        let hostname = reader("MONITOR_HOSTNAME")
            .or_else(|_| reader("HOSTNAME"))
            .unwrap_or_else(|_| "localhost".to_string());

        Ok(Self {
            es_url,
            branch,
            recipients,
            exemption,
            workers,
            hostname,
            namespace: Namespace::default(),
        })
    }

    pub fn require_recipients(&self) -> Result<&[String], ConfigError> {
        if self.recipients.is_empty() {
            return Err(ConfigError::MissingVar("RECIPIENTS".into()));
        }
        Ok(&self.recipients)
    }
}

/// Expand `$NAME` and `${NAME}`; unknown variables expand to nothing.
fn expand_vars<F>(input: &str, reader: &F) -> String
where
    F: Fn(&str) -> Result<String, VarError>,
{
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];

        let (name, consumed) = if let Some(braced) = after.strip_prefix('{') {
            match braced.find('}') {
                Some(end) => (&braced[..end], end + 2),
                None => ("", 0),
            }
        } else {
            let end = after
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .unwrap_or(after.len());
            (&after[..end], end)
        };

        if name.is_empty() {
            out.push('$');
            rest = after;
            continue;
        }
        out.push_str(&reader(name).unwrap_or_default());
        rest = &after[consumed..];
    }
    out.push_str(rest);
    out
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingVar(String),

    #[error("invalid value for {0}: {1}")]
    InvalidValue(String, String),
}
