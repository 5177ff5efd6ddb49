//! Retry decisions for read requests

use tracing::warn;

use crate::policy::ClientPolicy;
use crate::request::PreparedRequest;
use crate::transport::{TransportError, TransportErrorKind};

/// Decides whether a failed GET attempt is tried again.
///
/// Retries are immediate; there is no backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryDecider {
    max_retry: u32,
}

impl RetryDecider {
    pub fn new(max_retry: u32) -> Self {
        Self { max_retry }
    }

    pub fn from_policy(policy: &ClientPolicy) -> Self {
        Self::new(policy.get_max_retry)
    }

    pub fn max_retry(&self) -> u32 {
        self.max_retry
    }

    /// `retries_so_far` counts retries already made, not attempts, so a
    /// request is sent at most `max_retry + 1` times.
    pub fn should_retry(
        &self,
        error: &TransportError,
        request: &PreparedRequest,
        retries_so_far: u32,
    ) -> bool {
        if retries_so_far >= self.max_retry {
            return false;
        }

        // Retrying cannot fix these.
        if matches!(
            error.kind(),
            TransportErrorKind::UnknownHost
                | TransportErrorKind::ConnectTimeout
                | TransportErrorKind::Tls
        ) {
            return false;
        }

        if !request.method.is_idempotent() {
            return false;
        }

        warn!(
            method = %request.method,
            url = %request.url,
            attempt = retries_so_far + 1,
            max_retry = self.max_retry,
            kind = %error.kind(),
            error = %error,
            "Retrying request"
        );
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{prepare, Verb};
    use crate::types::Entity;

    fn request(verb: Verb) -> PreparedRequest {
        prepare(&ClientPolicy::new("http://localhost"), None, verb, "/r")
    }

    fn failure(kind: TransportErrorKind) -> TransportError {
        TransportError::new(kind, "failed")
    }

    #[test]
    fn test_retries_read_timeouts_up_to_max() {
        let decider = RetryDecider::new(3);
        let get = request(Verb::Get);
        let timeout = failure(TransportErrorKind::ReadTimeout);

        assert!(decider.should_retry(&timeout, &get, 0));
        assert!(decider.should_retry(&timeout, &get, 1));
        assert!(decider.should_retry(&timeout, &get, 2));
        assert!(!decider.should_retry(&timeout, &get, 3));
        assert!(!decider.should_retry(&timeout, &get, 10));
    }

    #[test]
    fn test_never_retries_unrecoverable_failures() {
        let decider = RetryDecider::new(3);
        let get = request(Verb::Get);

        for kind in [
            TransportErrorKind::UnknownHost,
            TransportErrorKind::ConnectTimeout,
            TransportErrorKind::Tls,
        ] {
            assert!(!decider.should_retry(&failure(kind), &get, 0), "{kind}");
        }
        assert!(decider.should_retry(&failure(TransportErrorKind::Io), &get, 0));
    }

    #[test]
    fn test_non_idempotent_methods_are_not_retried() {
        let decider = RetryDecider::new(3);
        let timeout = failure(TransportErrorKind::ReadTimeout);

        assert!(!decider.should_retry(&timeout, &request(Verb::Post(Entity::from("x"))), 0));
        assert!(!decider.should_retry(&timeout, &request(Verb::Patch(Entity::from("x"))), 0));
        assert!(decider.should_retry(&timeout, &request(Verb::Put(Entity::from("x"))), 0));
        assert!(decider.should_retry(&timeout, &request(Verb::Delete), 0));
    }

    #[test]
    fn test_zero_max_retry_disables_retries() {
        let decider = RetryDecider::from_policy(
            &ClientPolicy::new("http://localhost").with_get_max_retry(0),
        );
        assert_eq!(decider.max_retry(), 0);
        assert!(!decider.should_retry(
            &failure(TransportErrorKind::ReadTimeout),
            &request(Verb::Get),
            0
        ));
    }
}
