//! Dummy job: sleeps instead of talking to a server
//!
//! Useful for checking the harness itself; `setup` never connects.

use std::thread;
use std::time::Duration;

use super::JobStrategy;
use crate::client::ConnectionFactory;
use crate::utils::Result;

pub struct TestJob {
    max_wait_ms: u64,
    rng: fastrand::Rng,
}

impl TestJob {
    /// Each request sleeps a random 0..=`max_wait_ms` milliseconds
    pub fn new(max_wait_ms: u64) -> Self {
        Self {
            max_wait_ms,
            rng: fastrand::Rng::new(),
        }
    }
}

impl JobStrategy for TestJob {
    type Connection = ();

    fn setup(&mut self, _factory: &ConnectionFactory) -> Result<()> {
        Ok(())
    }

    fn request(&mut self, _conn: &mut ()) -> Result<bool> {
        if self.max_wait_ms > 0 {
            let wait = self.rng.u64(0..=self.max_wait_ms);
            thread::sleep(Duration::from_millis(wait));
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn factory() -> ConnectionFactory {
        ConnectionFactory {
            url: "ldap://localhost/".to_string(),
            connect_timeout: Duration::from_secs(1),
            starttls: false,
            tls_skip_verify: false,
            credentials: None,
        }
    }

    #[test]
    fn test_always_succeeds() {
        let mut job = TestJob::new(0);
        let mut conn = job.setup(&factory()).unwrap();
        for _ in 0..10 {
            assert!(job.request(&mut conn).unwrap());
        }
    }

    #[test]
    fn test_wait_is_bounded() {
        let mut job = TestJob::new(5);
        let mut conn = job.setup(&factory()).unwrap();
        let start = Instant::now();
        job.request(&mut conn).unwrap();
        assert!(start.elapsed() < Duration::from_secs(1));
    }
}
