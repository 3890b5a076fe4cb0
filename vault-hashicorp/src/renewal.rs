//! Scheduled token renewal.

use crate::client::VaultClient;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Lower bound between two renewals.
const MIN_RENEW_DELAY: Duration = Duration::from_secs(1);

/// Background task keeping the Vault token alive.
///
/// Renews once at start, then `renew_buffer` before each granted TTL runs
/// out. Stops on the first failure or when the shutdown channel flips.
#[derive(Debug)]
pub struct TokenRenewTask {
    client: Arc<VaultClient>,
    shutdown: watch::Receiver<bool>,
}

impl TokenRenewTask {
    /// Create a task bound to `client`.
    #[must_use]
    pub const fn new(client: Arc<VaultClient>, shutdown: watch::Receiver<bool>) -> Self {
        Self { client, shutdown }
    }

    /// Spawn onto the current runtime.
    #[must_use]
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Run until failure or shutdown.
    pub async fn run(mut self) {
        if !self.client.settings().scheduled_token_renew_enabled {
            info!("Scheduled token renewal disabled");
            return;
        }

        match self.client.look_up_token().await {
            Ok(token) if token.renewable => {}
            Ok(_) => {
                warn!("Vault token is not renewable, scheduled renewal disabled");
                return;
            }
            Err(e) => {
                error!(error = %e, "Vault token lookup failed, scheduled renewal disabled");
                return;
            }
        }

        let buffer = self.client.settings().token_renew_buffer;
        loop {
            if *self.shutdown.borrow() {
                break;
            }

            let ttl = match self.client.renew_token().await {
                Ok(ttl) => ttl,
                Err(e) => {
                    error!(error = %e, "Scheduled token renewal stopped");
                    return;
                }
            };

            let delay = next_delay(ttl, buffer);
            info!(ttl_secs = ttl.as_secs(), next_in_ms = delay.as_millis(), "Vault token renewed");

            tokio::select! {
                () = tokio::time::sleep(delay) => {}
                changed = self.shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        info!("Scheduled token renewal shut down");
    }
}

fn next_delay(ttl: Duration, buffer: Duration) -> Duration {
    ttl.checked_sub(buffer)
        .filter(|delay| !delay.is_zero())
        .unwrap_or(ttl / 2)
        .max(MIN_RENEW_DELAY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VaultSettings;
    use secrecy::SecretString;
    use test_utils::fixtures::{vault_auth_response, vault_token_lookup_response};
    use url::Url;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer, renew_enabled: bool) -> Arc<VaultClient> {
        let settings = VaultSettings::new(
            Url::parse(&server.uri()).unwrap(),
            SecretString::from("s.renew".to_string()),
        )
        .with_scheduled_token_renew(renew_enabled)
        .with_retry(connector_common::RetryConfig::default().with_max_retries(0));
        Arc::new(VaultClient::new(settings).unwrap())
    }

    async fn mount_lookup(server: &MockServer, renewable: bool) {
        Mock::given(method("GET"))
            .and(path("/v1/auth/token/lookup-self"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(vault_token_lookup_response(60, renewable)),
            )
            .mount(server)
            .await;
    }

    #[test]
    fn test_next_delay() {
        assert_eq!(next_delay(Duration::from_secs(300), Duration::from_secs(30)), Duration::from_secs(270));
        assert_eq!(next_delay(Duration::from_secs(20), Duration::from_secs(30)), Duration::from_secs(10));
        assert_eq!(next_delay(Duration::ZERO, Duration::from_secs(30)), MIN_RENEW_DELAY);
    }

    #[tokio::test]
    async fn test_disabled_renewal_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        let (_tx, rx) = watch::channel(false);

        TokenRenewTask::new(client(&server, false), rx).run().await;
    }

    #[tokio::test]
    async fn test_non_renewable_token_stops() {
        let server = MockServer::start().await;
        mount_lookup(&server, false).await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        let (_tx, rx) = watch::channel(false);

        TokenRenewTask::new(client(&server, true), rx).run().await;
    }

    #[tokio::test]
    async fn test_failed_renewal_stops() {
        let server = MockServer::start().await;
        mount_lookup(&server, true).await;
        Mock::given(method("POST"))
            .and(path("/v1/auth/token/renew-self"))
            .respond_with(ResponseTemplate::new(403))
            .expect(1)
            .mount(&server)
            .await;
        let (_tx, rx) = watch::channel(false);

        tokio::time::timeout(Duration::from_secs(5), TokenRenewTask::new(client(&server, true), rx).run())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_renews_on_schedule_until_shutdown() {
        let server = MockServer::start().await;
        mount_lookup(&server, true).await;
        Mock::given(method("POST"))
            .and(path("/v1/auth/token/renew-self"))
            .respond_with(ResponseTemplate::new(200).set_body_json(vault_auth_response("s.renew", 1)))
            .mount(&server)
            .await;
        let (tx, rx) = watch::channel(false);

        let handle = TokenRenewTask::new(client(&server, true), rx).spawn();
        tokio::time::sleep(Duration::from_millis(1500)).await;
        tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(2), handle).await.unwrap().unwrap();

        let renewals = server
            .received_requests()
            .await
            .unwrap()
            .iter()
            .filter(|r| r.url.path() == "/v1/auth/token/renew-self")
            .count();
        assert!(renewals >= 2, "expected at least two renewals, saw {renewals}");
    }
}
