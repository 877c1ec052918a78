//! LDAP MODIFY benchmark
//!
//! Replaces one attribute on the entries created by the add job.

use std::collections::HashSet;

use ldap3::Mod;

use super::{check_result, sequence_dn, JobStrategy};
use crate::client::{ConnectionFactory, LdapSession};
use crate::config::ModifyArgs;
use crate::utils::Result;

pub struct ModifyJob {
    worker_id: usize,
    base_dn: String,
    attr: String,
    value: String,
    seq: u64,
}

impl ModifyJob {
    pub fn new(worker_id: usize, args: &ModifyArgs) -> Self {
        Self {
            worker_id,
            base_dn: args.common.base_dn.clone(),
            attr: args.attr.clone(),
            value: args.value.clone(),
            seq: 0,
        }
    }

    fn next_dn(&mut self) -> String {
        let dn = sequence_dn(self.worker_id, self.seq, &self.base_dn);
        self.seq += 1;
        dn
    }
}

impl JobStrategy for ModifyJob {
    type Connection = LdapSession;

    fn setup(&mut self, factory: &ConnectionFactory) -> Result<LdapSession> {
        Ok(factory.create()?)
    }

    fn request(&mut self, conn: &mut LdapSession) -> Result<bool> {
        let dn = self.next_dn();
        let mods = vec![Mod::Replace(
            self.attr.as_str(),
            HashSet::from([self.value.as_str()]),
        )];

        let outcome = conn.ldap()?.modify(&dn, mods);
        check_result("modify", &dn, outcome)
    }

    fn teardown(&mut self, mut conn: LdapSession) {
        conn.close();
    }
}
