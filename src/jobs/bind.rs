//! LDAP BIND benchmark
//!
//! Every request re-binds the worker's connection. With `--last` and a
//! `%d` placeholder in `-D`, each bind picks a random user from the range.

use super::{check_result, IdPicker, JobStrategy};
use crate::client::{ConnectionFactory, LdapSession};
use crate::config::BindArgs;
use crate::utils::Result;

pub struct BindJob {
    dn_template: String,
    password: String,
    ids: IdPicker,
}

impl BindJob {
    pub fn new(args: &BindArgs) -> Self {
        Self {
            dn_template: args.common.bind_dn.clone(),
            password: args.common.bind_pw.clone().unwrap_or_default(),
            ids: IdPicker::for_template(&args.common.bind_dn, &args.ids),
        }
    }

    fn next_dn(&mut self) -> String {
        self.ids.render(&self.dn_template)
    }
}

impl JobStrategy for BindJob {
    type Connection = LdapSession;

    fn setup(&mut self, factory: &ConnectionFactory) -> Result<LdapSession> {
        // The bind under test is the request itself
        Ok(factory.connect()?)
    }

    fn request(&mut self, conn: &mut LdapSession) -> Result<bool> {
        let dn = self.next_dn();
        let outcome = conn.ldap()?.simple_bind(&dn, &self.password);
        check_result("bind", &dn, outcome)
    }

    fn teardown(&mut self, mut conn: LdapSession) {
        conn.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CliArgs, Command};
    use clap::Parser;

    fn bind_args(argv: &[&str]) -> BindArgs {
        match CliArgs::parse_from(argv).command {
            Command::Bind(b) => b,
            _ => panic!("expected bind"),
        }
    }

    #[test]
    fn test_fixed_dn() {
        let args = bind_args(&["lb", "bind", "-w", "pw", "ldap://localhost/"]);
        let mut job = BindJob::new(&args);
        assert_eq!(job.next_dn(), "cn=Manager,dc=example,dc=com");
        assert_eq!(job.password, "pw");
    }

    #[test]
    fn test_templated_dn() {
        let args = bind_args(&[
            "lb",
            "bind",
            "-D",
            "cn=user%04d,dc=example,dc=com",
            "--first",
            "3",
            "--last",
            "3",
            "ldap://localhost/",
        ]);
        let mut job = BindJob::new(&args);
        assert_eq!(job.next_dn(), "cn=user0003,dc=example,dc=com");
    }
}
