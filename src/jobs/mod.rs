//! Benchmark jobs
//!
//! A job defines what one request sends. The harness never looks inside:
//! it calls `setup` once per worker, `request` once per iteration and
//! `teardown` when the loop is over. New operations are added by
//! implementing [`JobStrategy`].

pub mod add;
pub mod bind;
pub mod delete;
pub mod modify;
pub mod noop;
pub mod search;

pub use add::AddJob;
pub use bind::BindJob;
pub use delete::DeleteJob;
pub use modify::ModifyJob;
pub use noop::TestJob;
pub use search::SearchJob;

use ldap3::{LdapError, LdapResult};

use crate::client::ConnectionFactory;
use crate::config::IdRangeArgs;
use crate::utils::{BenchmarkError, Result};

/// One protocol operation, instantiated once per worker
pub trait JobStrategy: Send + 'static {
    /// Per-worker connection, created on the worker thread
    type Connection;

    /// Open (and usually bind) the worker's connection.
    /// An error here is fatal to this worker only.
    fn setup(&mut self, factory: &ConnectionFactory) -> Result<Self::Connection>;

    /// Issue one request.
    ///
    /// `Ok(true)` is a success, `Ok(false)` and `Err(BenchmarkError::Request)`
    /// are counted failures. Any other error stops the worker.
    fn request(&mut self, conn: &mut Self::Connection) -> Result<bool>;

    /// Release the connection after the loop ends
    fn teardown(&mut self, conn: Self::Connection) {
        drop(conn);
    }
}

/// Replace `%d`, `%02d`, `%03d` and `%04d` in `template` with `id`
pub fn expand_id(template: &str, id: u32) -> String {
    template
        .replace("%04d", &format!("{:04}", id))
        .replace("%03d", &format!("{:03}", id))
        .replace("%02d", &format!("{:02}", id))
        .replace("%d", &id.to_string())
}

/// Random id source for templated DNs and filters
#[derive(Debug)]
pub struct IdPicker {
    first: u32,
    len: u32,
    rng: fastrand::Rng,
}

impl IdPicker {
    /// Picker over `ids`, disabled unless `template` contains a placeholder
    pub fn for_template(template: &str, ids: &IdRangeArgs) -> Self {
        let len = if template.contains('%') && !ids.is_empty() {
            ids.len()
        } else {
            0
        };
        Self {
            first: ids.first,
            len,
            rng: fastrand::Rng::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.len > 0
    }

    /// Expand `template` with a random id, or return it unchanged
    pub fn render(&mut self, template: &str) -> String {
        if self.is_enabled() {
            let id = self.first + self.rng.u32(0..self.len);
            expand_id(template, id)
        } else {
            template.to_string()
        }
    }
}

/// Map an LDAP operation outcome to a request outcome
pub(crate) fn check_result(
    op: &str,
    dn: &str,
    outcome: std::result::Result<LdapResult, LdapError>,
) -> Result<bool> {
    match outcome {
        Ok(res) if res.rc == 0 => Ok(true),
        Ok(res) => Err(BenchmarkError::Request(format!(
            "{} {}: rc={} {}",
            op, dn, res.rc, res.text
        ))),
        Err(e) => Err(BenchmarkError::Request(format!("{} {}: {}", op, dn, e))),
    }
}

/// DN of the entry a worker touches at a given sequence number.
/// Shared by add/modify/delete so the three jobs hit the same entries.
pub fn sequence_dn(worker_id: usize, seq: u64, base_dn: &str) -> String {
    format!("cn={}-{},{}", worker_id, seq, base_dn)
}
