//! Shared, read-only provider context handed to every handler call.

use std::time::Duration;
use tracing::debug;

use crate::api::ScpClient;
use crate::config::ProviderConfig;
use crate::error::Result;
use crate::poller::PollPolicy;

/// API client and polling policy of a configured provider.
#[derive(Debug, Clone)]
pub struct ProviderContext {
    client: ScpClient,
    policy: PollPolicy,
    settle_delays: bool,
}

impl ProviderContext {
    /// Builds the context from the provider configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        Ok(Self::with_client(
            ScpClient::new(config)?,
            PollPolicy::from_settings(&config.poll),
            config.poll.settle_delays,
        ))
    }

    /// Builds the context from parts.
    #[must_use]
    pub const fn with_client(client: ScpClient, policy: PollPolicy, settle_delays: bool) -> Self {
        Self {
            client,
            policy,
            settle_delays,
        }
    }

    /// The API client.
    #[must_use]
    pub const fn client(&self) -> &ScpClient {
        &self.client
    }

    /// The polling policy.
    #[must_use]
    pub const fn policy(&self) -> &PollPolicy {
        &self.policy
    }

    /// Waits for the remote side to settle after a mutating call, unless
    /// settle delays are disabled.
    pub async fn settle(&self, delay: Duration) {
        if self.settle_delays {
            debug!("Waiting {}s for the remote side to settle", delay.as_secs());
            tokio::time::sleep(delay).await;
        }
    }
}
