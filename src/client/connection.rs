//! Blocking LDAP connections for benchmark traffic
//!
//! Each worker thread owns one `LdapSession`. The underlying `ldap3::LdapConn`
//! drives its own single-threaded runtime, so calls block the worker thread
//! for the duration of one request.

use std::time::Duration;

use ldap3::{LdapConn, LdapConnSettings, LdapResult};
use tracing::debug;

use crate::utils::ConnectionError;

/// Credentials used for the initial simple bind
#[derive(Debug, Clone)]
pub struct BindCredentials {
    pub dn: String,
    pub password: String,
}

/// Factory for creating configured LDAP connections
#[derive(Debug, Clone)]
pub struct ConnectionFactory {
    pub url: String,
    pub connect_timeout: Duration,
    pub starttls: bool,
    pub tls_skip_verify: bool,
    /// Bind performed right after connecting (anonymous if `None`)
    pub credentials: Option<BindCredentials>,
}

impl ConnectionFactory {
    /// Open a connection without binding
    pub fn connect(&self) -> Result<LdapSession, ConnectionError> {
        let settings = LdapConnSettings::new()
            .set_conn_timeout(self.connect_timeout)
            .set_starttls(self.starttls)
            .set_no_tls_verify(self.tls_skip_verify);

        let conn = LdapConn::with_settings(settings, &self.url).map_err(|e| {
            ConnectionError::ConnectFailed {
                url: self.url.clone(),
                source: e,
            }
        })?;
        debug!("Connected to {}", self.url);

        Ok(LdapSession { conn, open: true })
    }

    /// Open a connection and bind with the configured credentials
    pub fn create(&self) -> Result<LdapSession, ConnectionError> {
        let mut session = self.connect()?;
        if let Some(ref creds) = self.credentials {
            session.bind(&creds.dn, &creds.password)?;
        }
        Ok(session)
    }
}

/// An established LDAP connection
pub struct LdapSession {
    conn: LdapConn,
    open: bool,
}

impl LdapSession {
    /// Simple bind, treating any non-zero result code as failure
    pub fn bind(&mut self, dn: &str, password: &str) -> Result<LdapResult, ConnectionError> {
        let result = self
            .conn
            .simple_bind(dn, password)
            .map_err(|e| ConnectionError::BindError {
                dn: dn.to_string(),
                source: e,
            })?;

        if result.rc != 0 {
            return Err(ConnectionError::BindFailed {
                dn: dn.to_string(),
                rc: result.rc,
                text: result.text,
            });
        }
        Ok(result)
    }

    /// Access the raw connection for protocol operations
    pub fn ldap(&mut self) -> Result<&mut LdapConn, ConnectionError> {
        if self.open {
            Ok(&mut self.conn)
        } else {
            Err(ConnectionError::Closed)
        }
    }

    /// Unbind and mark the session closed. Errors are ignored.
    pub fn close(&mut self) {
        if self.open {
            let _ = self.conn.unbind();
            self.open = false;
        }
    }
}

impl Drop for LdapSession {
    fn drop(&mut self) {
        self.close();
    }
}
