//! LDAP DELETE benchmark
//!
//! Deletes the entries created by the add job, in the same order.

use super::{check_result, sequence_dn, JobStrategy};
use crate::client::{ConnectionFactory, LdapSession};
use crate::config::DeleteArgs;
use crate::utils::Result;

pub struct DeleteJob {
    worker_id: usize,
    base_dn: String,
    seq: u64,
}

impl DeleteJob {
    pub fn new(worker_id: usize, args: &DeleteArgs) -> Self {
        Self {
            worker_id,
            base_dn: args.common.base_dn.clone(),
            seq: 0,
        }
    }

    fn next_dn(&mut self) -> String {
        let dn = sequence_dn(self.worker_id, self.seq, &self.base_dn);
        self.seq += 1;
        dn
    }
}

impl JobStrategy for DeleteJob {
    type Connection = LdapSession;

    fn setup(&mut self, factory: &ConnectionFactory) -> Result<LdapSession> {
        Ok(factory.create()?)
    }

    fn request(&mut self, conn: &mut LdapSession) -> Result<bool> {
        let dn = self.next_dn();
        let outcome = conn.ldap()?.delete(&dn);
        check_result("delete", &dn, outcome)
    }

    fn teardown(&mut self, mut conn: LdapSession) {
        conn.close();
    }
}
