//! Cached, postponed execution of a query.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use warden_cache::ResponseCache;
use warden_error::{AggregateError, AggregateErrorKind, WardenError};
use warden_interface::Messenger;

use crate::manager::CommandProcessor;
use crate::query::QueryProcessorFactory;
use crate::{CommandResult, SlashCommand};

/// Deadline for one background computation.
pub const DEFAULT_PROCESS_TIMEOUT: Duration = Duration::from_secs(25);

/// Default lifetime of a cached answer.
const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60);

/// Answers a command from the cache, or acknowledges it and delivers the
/// answer later.
///
/// On a cache miss the query runs in a background task under
/// `process_timeout`. Its rendered text, error messages included, is
/// cached for `cache_ttl` and then posted to the command's response URL.
/// A cached error is therefore replayed until it expires.
///
/// Identical queries arriving while one is still computing are not
/// coalesced: each computes and writes the cache, the last write wins.
pub struct PostponedCommandProcessor {
    name: String,
    token: String,
    factory: Arc<dyn QueryProcessorFactory>,
    cache: Arc<ResponseCache>,
    cache_ttl: Duration,
    messenger: Arc<dyn Messenger>,
    process_timeout: Duration,
    tracker: TaskTracker,
    shutdown: CancellationToken,
}

impl PostponedCommandProcessor {
    /// Create a processor for command `name` authenticated by `token`.
    pub fn new(
        name: impl Into<String>,
        token: impl Into<String>,
        factory: Arc<dyn QueryProcessorFactory>,
        cache: Arc<ResponseCache>,
        messenger: Arc<dyn Messenger>,
    ) -> Self {
        Self {
            name: name.into(),
            token: token.into(),
            factory,
            cache,
            cache_ttl: DEFAULT_CACHE_TTL,
            messenger,
            process_timeout: DEFAULT_PROCESS_TIMEOUT,
            tracker: TaskTracker::new(),
            shutdown: CancellationToken::new(),
        }
    }

    /// Set how long answers stay cached.
    pub fn with_cache_ttl(mut self, cache_ttl: Duration) -> Self {
        self.cache_ttl = cache_ttl;
        self
    }

    /// Set the deadline for one background computation.
    pub fn with_process_timeout(mut self, process_timeout: Duration) -> Self {
        self.process_timeout = process_timeout;
        self
    }

    /// Command name this processor serves.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of background computations still running.
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// Wait until every background computation has finished.
    pub async fn wait_idle(&self) {
        self.tracker.close();
        self.tracker.wait().await;
        self.tracker.reopen();
    }

    fn cache_key(&self, query_key: &str) -> String {
        format!("{}:{}", self.name, query_key)
    }
}

#[async_trait::async_trait]
impl CommandProcessor for PostponedCommandProcessor {
    fn auth_token(&self) -> &str {
        &self.token
    }

    #[tracing::instrument(skip(self, command, args), fields(command = %self.name, arg_count = args.len()))]
    fn process_command(
        &self,
        command: &SlashCommand,
        now: DateTime<Utc>,
        args: &[String],
    ) -> CommandResult {
        let mut query = self.factory.create();

        let mut prefix = String::new();
        if let Err(e) = query.init(args, now) {
            tracing::debug!(error = %e.message, "Argument rejected, using default window");
            prefix.push_str(&e.message);
            prefix.push('\n');
        }

        let key = self.cache_key(&query.cache_key());
        if let Some(text) = self.cache.get(&key) {
            tracing::debug!(key = %key, "Answer served from cache");
            return CommandResult::immediate(text);
        }
        tracing::debug!(key = %key, "Cache miss, postponing answer");

        let cache = Arc::clone(&self.cache);
        let cache_ttl = self.cache_ttl;
        let messenger = Arc::clone(&self.messenger);
        let process_timeout = self.process_timeout;
        let shutdown = self.shutdown.clone();
        let cancel = self.shutdown.child_token();
        let response_url = command.response_url.clone();

        self.tracker.spawn(async move {
            let answer = match tokio::time::timeout(process_timeout, query.process(&cancel)).await {
                Ok(Ok(text)) => text,
                Ok(Err(e)) => {
                    tracing::warn!(error = %e, "Query failed");
                    format!("{}\n", e.message())
                }
                Err(_) => {
                    cancel.cancel();
                    let e: WardenError =
                        AggregateError::new(AggregateErrorKind::TimedOut(process_timeout)).into();
                    tracing::warn!(timeout = ?process_timeout, "Query timed out");
                    format!("{}\n", e.message())
                }
            };

            if shutdown.is_cancelled() {
                tracing::info!(key = %key, "Shutting down, answer dropped");
                return;
            }

            cache.insert(key, answer.as_str(), cache_ttl);

            let text = prefix + &answer;
            if let Err(e) = messenger.send_postponed_message(&response_url, &text).await {
                tracing::error!(error = %e, "Failed to deliver postponed answer");
            }
        });

        CommandResult::postponed()
    }

    async fn shutdown(&self) {
        tracing::info!(command = %self.name, pending = self.tracker.len(), "Stopping command processor");
        self.shutdown.cancel();
        self.tracker.close();
        self.tracker.wait().await;
    }
}
