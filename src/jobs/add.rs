//! LDAP ADD benchmark
//!
//! Adds `person` entries named `cn=<worker>-<seq>` (or a random UUID with
//! `--uuid`) under the base DN.

use std::collections::HashSet;

use uuid::Uuid;

use super::{check_result, sequence_dn, JobStrategy};
use crate::client::{ConnectionFactory, LdapSession};
use crate::config::AddArgs;
use crate::utils::Result;

pub struct AddJob {
    worker_id: usize,
    base_dn: String,
    uuid: bool,
    seq: u64,
}

impl AddJob {
    pub fn new(worker_id: usize, args: &AddArgs) -> Self {
        Self {
            worker_id,
            base_dn: args.common.base_dn.clone(),
            uuid: args.uuid,
            seq: 0,
        }
    }

    /// (dn, cn) of the next entry
    fn next_entry(&mut self) -> (String, String) {
        let entry = if self.uuid {
            let cn = Uuid::new_v4().to_string();
            (format!("cn={},{}", cn, self.base_dn), cn)
        } else {
            (
                sequence_dn(self.worker_id, self.seq, &self.base_dn),
                format!("{}-{}", self.worker_id, self.seq),
            )
        };
        self.seq += 1;
        entry
    }
}

impl JobStrategy for AddJob {
    type Connection = LdapSession;

    fn setup(&mut self, factory: &ConnectionFactory) -> Result<LdapSession> {
        Ok(factory.create()?)
    }

    fn request(&mut self, conn: &mut LdapSession) -> Result<bool> {
        let (dn, cn) = self.next_entry();
        let sn = self.worker_id.to_string();
        let attrs = vec![
            ("objectClass", HashSet::from(["person"])),
            ("cn", HashSet::from([cn.as_str()])),
            ("sn", HashSet::from([sn.as_str()])),
            ("userPassword", HashSet::from(["secret"])),
        ];

        let outcome = conn.ldap()?.add(&dn, attrs);
        check_result("add", &dn, outcome)
    }

    fn teardown(&mut self, mut conn: LdapSession) {
        conn.close();
    }
}
