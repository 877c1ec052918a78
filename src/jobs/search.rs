//! LDAP SEARCH benchmark
//!
//! A request succeeds when the search returns at least one entry.

use ldap3::SearchResult;

use super::{IdPicker, JobStrategy};
use crate::client::{ConnectionFactory, LdapSession};
use crate::config::{SearchArgs, SearchScope};
use crate::utils::{BenchmarkError, Result};

pub struct SearchJob {
    base_dn: String,
    scope: SearchScope,
    filter: String,
    attributes: Vec<String>,
    ids: IdPicker,
}

impl SearchJob {
    pub fn new(args: &SearchArgs) -> Self {
        let attributes = args
            .attributes
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Self {
            base_dn: args.common.base_dn.clone(),
            scope: args.scope,
            filter: args.filter.clone(),
            attributes,
            ids: IdPicker::for_template(&args.filter, &args.ids),
        }
    }

    fn next_filter(&mut self) -> String {
        self.ids.render(&self.filter)
    }
}

impl JobStrategy for SearchJob {
    type Connection = LdapSession;

    fn setup(&mut self, factory: &ConnectionFactory) -> Result<LdapSession> {
        Ok(factory.create()?)
    }

    fn request(&mut self, conn: &mut LdapSession) -> Result<bool> {
        let filter = self.next_filter();
        let attrs: Vec<&str> = self.attributes.iter().map(String::as_str).collect();
        let outcome = conn
            .ldap()?
            .search(&self.base_dn, self.scope.into(), &filter, attrs);

        match outcome {
            Ok(SearchResult(entries, res)) if res.rc == 0 => Ok(!entries.is_empty()),
            Ok(SearchResult(_, res)) => Err(BenchmarkError::Request(format!(
                "search {}: rc={} {}",
                filter, res.rc, res.text
            ))),
            Err(e) => Err(BenchmarkError::Request(format!("search {}: {}", filter, e))),
        }
    }

    fn teardown(&mut self, mut conn: LdapSession) {
        conn.close();
    }
}
