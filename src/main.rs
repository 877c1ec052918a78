//! lb - LDAP load-testing tool
//!
//! Runs one benchmark job (bind, search, add, modify, delete or a dummy
//! sleep) with a fixed number of concurrent connections and prints an
//! ab-style summary.

use anyhow::Result;
use tracing::{error, warn, Level};
use tracing_subscriber::FmtSubscriber;

use ldap_bench::benchmark::{Coordinator, RunOutcome};
use ldap_bench::config::{BenchmarkConfig, CliArgs, Command, SetupCommand};
use ldap_bench::jobs::{AddJob, BindJob, DeleteJob, JobStrategy, ModifyJob, SearchJob, TestJob};
use ldap_bench::setup;

fn setup_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            _ => Level::DEBUG,
        }
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("Failed to set tracing subscriber");
    }
}

fn print_banner(job: &str, config: &BenchmarkConfig) {
    if config.quiet {
        return;
    }

    println!("This is LDAPBench, Version {}", env!("CARGO_PKG_VERSION"));
    println!("{} Benchmarking: {}", job, config.url);
    println!(
        "Requests: {} (planned {}), Concurrency: {}, Per worker: {}",
        config.requests,
        config.planned_requests(),
        config.concurrency,
        config.requests_per_worker
    );
    if let Some(limit) = config.time_limit {
        println!("Time limit: {}s", limit.as_secs());
    }
    println!();
}

fn run_job<J, F>(job: &str, config: BenchmarkConfig, make_job: F) -> Result<()>
where
    J: JobStrategy,
    F: FnMut(usize) -> J,
{
    print_banner(job, &config);

    let coordinator = Coordinator::new(config);
    if let RunOutcome::Completed(report) = coordinator.run(make_job)? {
        if !report.has_data() {
            warn!("No worker completed; check connection settings");
        }
    }
    Ok(())
}

fn run() -> Result<()> {
    let args = CliArgs::parse_args();
    let common = args.common();

    setup_logging(common.verbose, common.quiet);

    let config = BenchmarkConfig::from_cli(common)
        .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;
    let job = args.job_name();

    match &args.command {
        Command::Bind(a) => run_job(job, config, |_| BindJob::new(a)),
        Command::Search(a) => run_job(job, config, |_| SearchJob::new(a)),
        Command::Add(a) => run_job(job, config, |id| AddJob::new(id, a)),
        Command::Modify(a) => run_job(job, config, |id| ModifyJob::new(id, a)),
        Command::Delete(a) => run_job(job, config, |id| DeleteJob::new(id, a)),
        Command::Test(a) => run_job(job, config, |_| TestJob::new(a.wait_ms)),
        Command::Setup(SetupCommand::Base(a)) => {
            setup::run_base(a)?;
            Ok(())
        }
        Command::Setup(SetupCommand::Person(a)) => {
            let summary = setup::run_person(a)?;
            if !config.quiet {
                println!("{} added, {} failed", summary.added, summary.failed);
            }
            Ok(())
        }
    }
}

fn main() {
    if let Err(e) = run() {
        error!("Error: {:#}", e);
        std::process::exit(1);
    }
}
