//! Command-line argument parsing
//!
//! One subcommand per benchmark job. Options shared by every job live in
//! `CommonArgs` and are flattened into each subcommand, so
//! `lb bind -n 1000 -c 10 ldap://localhost/` reads the same for every job.

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

/// Default bind identity
pub const DEFAULT_BIND_DN: &str = "cn=Manager,dc=example,dc=com";

/// Default base DN for entries
pub const DEFAULT_BASE_DN: &str = "dc=example,dc=com";

/// LDAP benchmarking tool in the spirit of Apache Bench
#[derive(Parser, Debug, Clone)]
#[command(name = "lb")]
#[command(version, about = "LDAP Benchmarking Tool", long_about = None)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// LDAP BIND benchmarking
    Bind(BindArgs),
    /// LDAP SEARCH benchmarking
    Search(SearchArgs),
    /// LDAP ADD benchmarking
    Add(AddArgs),
    /// LDAP MODIFY benchmarking
    Modify(ModifyArgs),
    /// LDAP DELETE benchmarking
    Delete(DeleteArgs),
    /// Dummy benchmark that only sleeps (no server traffic)
    Test(TestArgs),
    /// Populate the directory with entries used by the benchmarks
    #[command(subcommand)]
    Setup(SetupCommand),
}

#[derive(Subcommand, Debug, Clone)]
pub enum SetupCommand {
    /// Add the base entry
    Base(SetupBaseArgs),
    /// Add person entries
    Person(SetupPersonArgs),
}

/// Options shared by every subcommand
#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    // ===== Benchmark Parameters =====
    /// Number of requests to perform
    #[arg(short = 'n', long = "requests", default_value_t = 1)]
    pub requests: u64,

    /// Number of multiple requests to make at a time
    #[arg(short = 'c', long = "concurrency", default_value_t = 1)]
    pub concurrency: usize,

    /// Seconds to spend on benchmarking before stopping early
    #[arg(short = 't', long = "timelimit")]
    pub time_limit_secs: Option<u64>,

    // ===== Connection Options =====
    /// Bind DN
    #[arg(short = 'D', long = "bind-dn", default_value = DEFAULT_BIND_DN)]
    pub bind_dn: String,

    /// Bind password
    #[arg(short = 'w', long = "bind-pw")]
    pub bind_pw: Option<String>,

    /// Base DN
    #[arg(short = 'b', long = "base-dn", default_value = DEFAULT_BASE_DN)]
    pub base_dn: String,

    /// Use StartTLS
    #[arg(short = 'Z', long = "starttls")]
    pub starttls: bool,

    /// Skip TLS certificate verification (insecure)
    #[arg(long = "tls-skip-verify")]
    pub tls_skip_verify: bool,

    /// Connection timeout in milliseconds
    #[arg(long = "connect-timeout", default_value_t = 5000)]
    pub connect_timeout_ms: u64,

    // ===== Output Options =====
    /// How much troubleshooting info to print (repeat for more)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (no banner)
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,

    /// Print a one-line result: concurrency, requests/sec, success rate
    #[arg(long = "short")]
    pub short: bool,

    /// Output format for the report
    #[arg(long = "format", value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Print latency percentiles
    #[arg(long = "histogram")]
    pub histogram: bool,

    /// LDAP URL (e.g. ldap://localhost:389/)
    #[arg(value_name = "URL")]
    pub url: String,
}

/// Id range used for `%d` substitution
#[derive(Args, Debug, Clone, Copy)]
pub struct IdRangeArgs {
    /// First id for `%d` substitution
    #[arg(long = "first", default_value_t = 1)]
    pub first: u32,

    /// Last id for `%d` substitution (0 disables substitution)
    #[arg(long = "last", default_value_t = 0)]
    pub last: u32,
}

#[derive(Args, Debug, Clone)]
pub struct BindArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    #[command(flatten)]
    pub ids: IdRangeArgs,
}

#[derive(Args, Debug, Clone)]
pub struct SearchArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    #[command(flatten)]
    pub ids: IdRangeArgs,

    /// Search scope
    #[arg(short = 's', long = "scope", value_enum, default_value_t = SearchScope::Sub)]
    pub scope: SearchScope,

    /// Search filter (`%d` is replaced with a random id)
    #[arg(short = 'f', long = "filter", default_value = "(objectClass=*)")]
    pub filter: String,

    /// Attributes to retrieve (comma-separated)
    #[arg(short = 'a', long = "attributes", default_value = "dn")]
    pub attributes: String,
}

#[derive(Args, Debug, Clone)]
pub struct AddArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Use a random UUID as the cn of new entries
    #[arg(long = "uuid")]
    pub uuid: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ModifyArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Attribute to replace
    #[arg(long = "attr", default_value = "sn")]
    pub attr: String,

    /// New attribute value
    #[arg(long = "value", default_value = "modified")]
    pub value: String,
}

#[derive(Args, Debug, Clone)]
pub struct DeleteArgs {
    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Args, Debug, Clone)]
pub struct TestArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Upper bound of the random per-request sleep in milliseconds
    #[arg(long = "wait-ms", default_value_t = 100)]
    pub wait_ms: u64,
}

#[derive(Args, Debug, Clone)]
pub struct SetupBaseArgs {
    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Args, Debug, Clone)]
pub struct SetupPersonArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    #[command(flatten)]
    pub ids: IdRangeArgs,

    /// cn prefix, or a `%d` template when combined with --last
    #[arg(long = "cn", default_value = "user")]
    pub cn: String,

    /// sn attribute (defaults to cn)
    #[arg(long = "sn")]
    pub sn: Option<String>,

    /// userPassword attribute
    #[arg(long = "password", default_value = "secret")]
    pub password: String,
}

/// Search scope
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchScope {
    Base,
    One,
    #[default]
    Sub,
}

impl From<SearchScope> for ldap3::Scope {
    fn from(scope: SearchScope) -> Self {
        match scope {
            SearchScope::Base => ldap3::Scope::Base,
            SearchScope::One => ldap3::Scope::OneLevel,
            SearchScope::Sub => ldap3::Scope::Subtree,
        }
    }
}

/// Output format for results
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl CliArgs {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Options shared by all subcommands
    pub fn common(&self) -> &CommonArgs {
        match &self.command {
            Command::Bind(a) => &a.common,
            Command::Search(a) => &a.common,
            Command::Add(a) => &a.common,
            Command::Modify(a) => &a.common,
            Command::Delete(a) => &a.common,
            Command::Test(a) => &a.common,
            Command::Setup(SetupCommand::Base(a)) => &a.common,
            Command::Setup(SetupCommand::Person(a)) => &a.common,
        }
    }

    /// Name of the selected job, used in the banner
    pub fn job_name(&self) -> &'static str {
        match &self.command {
            Command::Bind(_) => "BIND",
            Command::Search(_) => "SEARCH",
            Command::Add(_) => "ADD",
            Command::Modify(_) => "MODIFY",
            Command::Delete(_) => "DELETE",
            Command::Test(_) => "TEST",
            Command::Setup(_) => "SETUP",
        }
    }
}

impl CommonArgs {
    /// Validate argument combinations
    pub fn validate(&self) -> Result<(), String> {
        if self.concurrency == 0 {
            return Err("-c must be at least 1".to_string());
        }

        if self.requests == 0 {
            return Err("-n must be at least 1".to_string());
        }

        if self.time_limit_secs == Some(0) {
            return Err("--timelimit must be at least 1 second".to_string());
        }

        if self.short && self.format == OutputFormat::Json {
            return Err("--short cannot be combined with --format json".to_string());
        }

        Ok(())
    }
}

impl IdRangeArgs {
    /// Number of ids in the range, 0 when substitution is disabled
    pub fn len(&self) -> u32 {
        if self.last == 0 || self.last < self.first {
            0
        } else {
            (self.last - self.first).checked_add(1).unwrap_or(u32::MAX)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
