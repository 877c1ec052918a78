//! Directory bootstrap for benchmark runs
//!
//! `setup base` creates the base entry, `setup person` creates the person
//! entries that `bind` and `search` runs address by id.

use std::collections::HashSet;

use tracing::warn;

use crate::client::LdapSession;
use crate::config::{BenchmarkConfig, SetupBaseArgs, SetupPersonArgs};
use crate::jobs::expand_id;
use crate::utils::{BenchmarkError, Result};

/// Entries written by a setup command
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SetupSummary {
    pub added: u64,
    pub failed: u64,
}

/// Add the `dcObject`/`organization` base entry
pub fn run_base(args: &SetupBaseArgs) -> Result<SetupSummary> {
    let config = BenchmarkConfig::from_cli(&args.common).map_err(BenchmarkError::Config)?;
    let mut session = open(&config)?;

    let base_dn = &config.base_dn;
    let dc = dc_value(base_dn);
    let attrs = vec![
        ("objectClass", HashSet::from(["dcObject", "organization"])),
        ("o", HashSet::from(["lb"])),
        ("dc", HashSet::from([dc])),
    ];

    if !config.quiet {
        println!("Adding base entry: {}", base_dn);
    }
    let mut summary = SetupSummary::default();
    let outcome = session.ldap()?.add(base_dn, attrs);
    record(&mut summary, config.quiet, base_dn, outcome);

    session.close();
    Ok(summary)
}

/// Add one `person` entry per id in `--first..=--last`, or a single entry
/// named by `--cn` when `--last` is 0
pub fn run_person(args: &SetupPersonArgs) -> Result<SetupSummary> {
    let config = BenchmarkConfig::from_cli(&args.common).map_err(BenchmarkError::Config)?;
    let mut session = open(&config)?;
    let mut summary = SetupSummary::default();

    for cn in person_names(&args.cn, args.ids.first, args.ids.last) {
        let dn = format!("cn={},{}", cn, config.base_dn);
        let sn = args.sn.as_deref().unwrap_or(&cn);
        let attrs = vec![
            ("objectClass", HashSet::from(["person"])),
            ("cn", HashSet::from([cn.as_str()])),
            ("sn", HashSet::from([sn])),
            ("userPassword", HashSet::from([args.password.as_str()])),
        ];

        if !config.quiet {
            println!("Adding person entry: {}", dn);
        }
        let outcome = session.ldap()?.add(&dn, attrs);
        record(&mut summary, config.quiet, &dn, outcome);
    }

    session.close();
    Ok(summary)
}

fn open(config: &BenchmarkConfig) -> Result<LdapSession> {
    if config.bind_pw.is_none() {
        warn!("No bind password given, adding entries anonymously");
    }
    Ok(config.connection_factory().create()?)
}

fn record(
    summary: &mut SetupSummary,
    quiet: bool,
    dn: &str,
    outcome: std::result::Result<ldap3::LdapResult, ldap3::LdapError>,
) {
    match outcome {
        Ok(res) if res.rc == 0 => {
            summary.added += 1;
            if !quiet {
                println!("Added: {}", dn);
            }
        }
        Ok(res) => {
            summary.failed += 1;
            eprintln!("Add error for {}: {} (rc={})", dn, res.text, res.rc);
        }
        Err(e) => {
            summary.failed += 1;
            eprintln!("Add error for {}: {}", dn, e);
        }
    }
}

/// `dc` attribute for a base DN (`dc=example,dc=com` -> `example`)
pub fn dc_value(base_dn: &str) -> &str {
    base_dn
        .split(',')
        .next()
        .map(str::trim)
        .and_then(|rdn| rdn.strip_prefix("dc="))
        .unwrap_or("example")
}

/// cn values for `setup person`.
///
/// A template containing `%` is expanded per id; otherwise the id is
/// appended to the prefix.
pub fn person_names(cn: &str, first: u32, last: u32) -> Vec<String> {
    if last == 0 {
        return vec![cn.to_string()];
    }
    (first..=last)
        .map(|id| {
            if cn.contains('%') {
                expand_id(cn, id)
            } else {
                format!("{}{}", cn, id)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dc_value() {
        assert_eq!(dc_value("dc=example,dc=com"), "example");
        assert_eq!(dc_value("dc=corp"), "corp");
        assert_eq!(dc_value("o=acme,c=us"), "example");
    }

    #[test]
    fn test_person_names_single() {
        assert_eq!(person_names("user", 1, 0), vec!["user"]);
    }

    #[test]
    fn test_person_names_suffix() {
        assert_eq!(person_names("user", 1, 3), vec!["user1", "user2", "user3"]);
    }

    #[test]
    fn test_person_names_template() {
        assert_eq!(
            person_names("user%04d", 9, 10),
            vec!["user0009", "user0010"]
        );
    }

    #[test]
    fn test_person_names_empty_range() {
        assert!(person_names("user", 5, 2).is_empty());
    }

    #[test]
    #[ignore]
    fn test_setup_base_against_server() {
        use crate::config::{CliArgs, Command, SetupCommand};
        use clap::Parser;

        let args = CliArgs::parse_from(["lb", "setup", "base", "-w", "secret", "ldap://127.0.0.1:389"]);
        if let Command::Setup(SetupCommand::Base(a)) = args.command {
            let summary = run_base(&a).unwrap();
            assert_eq!(summary.added + summary.failed, 1);
        }
    }
}
