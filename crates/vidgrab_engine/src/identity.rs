use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use vidgrab_logging::{vg_debug, TARGET_ENGINE};

use crate::{AuthError, Identity};

/// Receives session changes from an [`IdentityProvider`].
pub trait SessionSink: Send + Sync {
    fn session_changed(&self, identity: Option<Identity>);
}

/// Live subscription to a provider's session stream. Delivery stops when the
/// subscription is dropped or [`Subscription::unsubscribe`] is called.
#[derive(Debug)]
pub struct Subscription {
    token: CancellationToken,
}

impl Subscription {
    pub fn new(token: CancellationToken) -> Self {
        Self { token }
    }

    pub fn unsubscribe(self) {
        drop(self);
    }

    pub fn is_active(&self) -> bool {
        !self.token.is_cancelled()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Start delivering session changes to `sink`, beginning with the current one.
    async fn subscribe(&self, sink: Arc<dyn SessionSink>) -> Subscription;

    /// Run the provider's interactive sign-in. On success the new session is
    /// also published to subscribers.
    async fn sign_in_interactive(&self) -> Result<Identity, AuthError>;

    async fn sign_out(&self) -> Result<(), AuthError>;
}

/// In-process identity provider backed by a watch channel.
///
/// Interactive sign-in resolves to whatever outcome was configured with
/// [`LocalIdentityProvider::set_sign_in_outcome`]; by default it is dismissed.
pub struct LocalIdentityProvider {
    current: watch::Sender<Option<Identity>>,
    sign_in_outcome: Mutex<Result<Identity, AuthError>>,
}

impl LocalIdentityProvider {
    pub fn new(initial: Option<Identity>) -> Self {
        let (current, _) = watch::channel(initial);
        Self {
            current,
            sign_in_outcome: Mutex::new(Err(AuthError::Dismissed)),
        }
    }

    pub fn with_account(self, identity: Identity) -> Self {
        self.set_sign_in_outcome(Ok(identity));
        self
    }

    pub fn set_sign_in_outcome(&self, outcome: Result<Identity, AuthError>) {
        *self
            .sign_in_outcome
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = outcome;
    }

    /// Publish a session change that did not come from this process,
    /// e.g. an expired token.
    pub fn publish(&self, identity: Option<Identity>) {
        self.current.send_replace(identity);
    }

    pub fn current(&self) -> Option<Identity> {
        self.current.borrow().clone()
    }
}

#[async_trait::async_trait]
impl IdentityProvider for LocalIdentityProvider {
    async fn subscribe(&self, sink: Arc<dyn SessionSink>) -> Subscription {
        let mut rx = self.current.subscribe();
        let token = CancellationToken::new();
        let stop = token.clone();

        tokio::spawn(async move {
            let first = rx.borrow_and_update().clone();
            sink.session_changed(first);
            loop {
                tokio::select! {
                    biased;
                    _ = stop.cancelled() => break,
                    changed = rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let identity = rx.borrow_and_update().clone();
                        if stop.is_cancelled() {
                            break;
                        }
                        sink.session_changed(identity);
                    }
                }
            }
            vg_debug!(target: TARGET_ENGINE, "Session subscription ended");
        });

        Subscription::new(token)
    }

    async fn sign_in_interactive(&self) -> Result<Identity, AuthError> {
        let outcome = self
            .sign_in_outcome
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Ok(identity) = &outcome {
            self.publish(Some(identity.clone()));
        }
        outcome
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.publish(None);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use super::*;

    #[derive(Default)]
    struct RecordingSink {
        seen: Mutex<Vec<Option<Identity>>>,
    }

    impl RecordingSink {
        fn names(&self) -> Vec<Option<String>> {
            self.seen
                .lock()
                .unwrap()
                .iter()
                .map(|identity| identity.as_ref().map(|id| id.display_name.clone()))
                .collect()
        }
    }

    impl SessionSink for RecordingSink {
        fn session_changed(&self, identity: Option<Identity>) {
            self.seen.lock().unwrap().push(identity);
        }
    }

    fn alice() -> Identity {
        Identity {
            display_name: "Alice".into(),
            photo_url: None,
        }
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    #[tokio::test]
    async fn subscriber_sees_current_then_changes() {
        let provider = LocalIdentityProvider::new(None).with_account(alice());
        let sink = Arc::new(RecordingSink::default());
        let _subscription = provider.subscribe(sink.clone()).await;
        settle().await;

        provider.sign_in_interactive().await.unwrap();
        settle().await;
        provider.sign_out().await.unwrap();
        settle().await;

        assert_eq!(sink.names(), vec![None, Some("Alice".into()), None]);
    }

    #[tokio::test]
    async fn dismissed_sign_in_publishes_nothing() {
        let provider = LocalIdentityProvider::new(None);
        let sink = Arc::new(RecordingSink::default());
        let _subscription = provider.subscribe(sink.clone()).await;
        settle().await;

        assert_eq!(
            provider.sign_in_interactive().await,
            Err(AuthError::Dismissed)
        );
        settle().await;
        assert_eq!(sink.names(), vec![None]);
        assert_eq!(provider.current(), None);
    }

    #[tokio::test]
    async fn unsubscribe_stops_delivery() {
        let provider = LocalIdentityProvider::new(None);
        let sink = Arc::new(RecordingSink::default());
        let subscription = provider.subscribe(sink.clone()).await;
        settle().await;
        assert!(subscription.is_active());

        subscription.unsubscribe();
        provider.publish(Some(alice()));
        settle().await;

        assert_eq!(sink.names(), vec![None]);
    }
}
