//! Client connection layer

pub mod connection;

pub use connection::{BindCredentials, ConnectionFactory, LdapSession};
