//! Benchmark configuration derived from CLI arguments

use std::time::Duration;

use super::cli::{CommonArgs, OutputFormat};
use crate::client::{BindCredentials, ConnectionFactory};

/// Complete benchmark configuration
#[derive(Debug, Clone)]
pub struct BenchmarkConfig {
    // Connection
    pub url: String,
    pub bind_dn: String,
    pub bind_pw: Option<String>,
    pub base_dn: String,
    pub starttls: bool,
    pub tls_skip_verify: bool,
    pub connect_timeout_ms: u64,

    // Load shape
    pub requests: u64,
    pub concurrency: usize,
    pub requests_per_worker: u64,
    pub time_limit: Option<Duration>,

    // Output
    pub verbose: u8,
    pub quiet: bool,
    pub short: bool,
    pub format: OutputFormat,
    pub histogram: bool,
}

impl BenchmarkConfig {
    /// Create configuration from CLI arguments
    pub fn from_cli(args: &CommonArgs) -> Result<Self, String> {
        args.validate()?;

        Ok(Self {
            url: args.url.clone(),
            bind_dn: args.bind_dn.clone(),
            bind_pw: args.bind_pw.clone(),
            base_dn: args.base_dn.clone(),
            starttls: args.starttls,
            tls_skip_verify: args.tls_skip_verify,
            connect_timeout_ms: args.connect_timeout_ms,

            requests: args.requests,
            concurrency: args.concurrency,
            requests_per_worker: requests_per_worker(args.requests, args.concurrency),
            time_limit: args.time_limit_secs.map(Duration::from_secs),

            verbose: args.verbose,
            quiet: args.quiet,
            short: args.short,
            format: args.format,
            histogram: args.histogram,
        })
    }

    /// Minimal configuration for a run against `url`
    pub fn new(url: &str, requests: u64, concurrency: usize) -> Self {
        Self {
            url: url.to_string(),
            bind_dn: super::cli::DEFAULT_BIND_DN.to_string(),
            bind_pw: None,
            base_dn: super::cli::DEFAULT_BASE_DN.to_string(),
            starttls: false,
            tls_skip_verify: false,
            connect_timeout_ms: 5000,
            requests,
            concurrency,
            requests_per_worker: requests_per_worker(requests, concurrency),
            time_limit: None,
            verbose: 0,
            quiet: true,
            short: false,
            format: OutputFormat::Text,
            histogram: false,
        }
    }

    /// Sum of every worker's iteration target (at least `requests`)
    pub fn planned_requests(&self) -> u64 {
        self.requests_per_worker * self.concurrency as u64
    }

    /// Connection factory binding with `-D`/`-w` when a password was given
    pub fn connection_factory(&self) -> ConnectionFactory {
        ConnectionFactory {
            url: self.url.clone(),
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            starttls: self.starttls,
            tls_skip_verify: self.tls_skip_verify,
            credentials: self.bind_pw.as_ref().map(|pw| BindCredentials {
                dn: self.bind_dn.clone(),
                password: pw.clone(),
            }),
        }
    }
}

/// `ceil(requests / concurrency)`
pub fn requests_per_worker(requests: u64, concurrency: usize) -> u64 {
    requests.div_ceil(concurrency.max(1) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CliArgs;
    use clap::Parser;

    #[test]
    fn test_requests_per_worker() {
        assert_eq!(requests_per_worker(10, 2), 5);
        assert_eq!(requests_per_worker(10, 3), 4);
        assert_eq!(requests_per_worker(1, 1), 1);
        assert_eq!(requests_per_worker(1, 8), 1);
    }

    #[test]
    fn test_planned_requests_bounds() {
        for n in 1..=64u64 {
            for c in 1..=16usize {
                let config = BenchmarkConfig::new("ldap://localhost/", n, c);
                assert!(config.requests_per_worker >= 1);
                assert!(config.planned_requests() >= n);
                assert!(config.planned_requests() < n + c as u64);
            }
        }
    }

    #[test]
    fn test_from_cli() {
        let args = CliArgs::parse_from([
            "lb", "test", "-n", "10", "-c", "3", "-t", "5", "ldap://localhost/",
        ]);
        let config = BenchmarkConfig::from_cli(args.common()).unwrap();
        assert_eq!(config.requests_per_worker, 4);
        assert_eq!(config.time_limit, Some(Duration::from_secs(5)));
        assert!(config.connection_factory().credentials.is_none());
    }

    #[test]
    fn test_connection_factory_credentials() {
        let args = CliArgs::parse_from(["lb", "add", "-w", "secret", "ldap://localhost/"]);
        let config = BenchmarkConfig::from_cli(args.common()).unwrap();
        let creds = config.connection_factory().credentials.unwrap();
        assert_eq!(creds.dn, "cn=Manager,dc=example,dc=com");
        assert_eq!(creds.password, "secret");
    }
}
