//! Builds every component from the configuration and runs them.

use std::sync::Arc;
use tokio::net::TcpListener;
use warden_aggregate::{DutyAggregator, TimelogAggregator};
use warden_bot::{DEFAULT_TICK, DailyScheduler, DutyDigest, TimelogDigest};
use warden_cache::{DEFAULT_CAPACITY, ResponseCache};
use warden_commands::{
    CommandProcessManager, DutyQueryFactory, PostponedCommandProcessor, TimelogQueryFactory,
};
use warden_interface::{DutyProvider, Messenger, TimelogProvider};
use warden_providers::{JiraClient, OpsgenieClient, PagerdutyClient, SlackClient};

use crate::{ApiState, DutyProviderKind, WardenConfig, create_router};

/// Command manager and daily scheduler built from one configuration.
pub struct App {
    manager: Arc<CommandProcessManager>,
    scheduler: Arc<DailyScheduler>,
}

impl App {
    /// Build the bot with the real upstream clients.
    pub fn from_config(config: &WardenConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.retry().call_timeout())
            .build()?;

        let messenger: Arc<dyn Messenger> = Arc::new(SlackClient::new(
            http.clone(),
            config.slack().api_url(),
            config.slack().token(),
        ));
        let duty: Arc<dyn DutyProvider> = match config.duty_command().provider() {
            DutyProviderKind::Opsgenie => Arc::new(OpsgenieClient::new(
                http.clone(),
                config.opsgenie().base_url(),
                config.opsgenie().token(),
            )),
            DutyProviderKind::Pagerduty => Arc::new(
                PagerdutyClient::new(
                    http.clone(),
                    config.pagerduty().api_url(),
                    config.pagerduty().token(),
                )
                .with_time_zone(config.pagerduty().time_zone()),
            ),
        };
        let timelog: Arc<dyn TimelogProvider> = Arc::new(JiraClient::new(
            http,
            config.jira().base_url(),
            config.jira().token(),
        ));

        Self::with_clients(config, duty, timelog, messenger)
    }

    /// Build the bot around the given clients.
    pub fn with_clients(
        config: &WardenConfig,
        duty: Arc<dyn DutyProvider>,
        timelog: Arc<dyn TimelogProvider>,
        messenger: Arc<dyn Messenger>,
    ) -> anyhow::Result<Self> {
        let manager = Arc::new(CommandProcessManager::new());
        let scheduler = Arc::new(DailyScheduler::new(DEFAULT_TICK));
        let cache = Arc::new(ResponseCache::with_capacity(DEFAULT_CAPACITY));
        let process_timeout = config.server().process_timeout();
        let channel = config.slack().channel();

        let duty_config = config.duty_command();
        if *duty_config.enable() {
            let aggregator = DutyAggregator::new(duty, config.retry().call_timeout());
            let factory = DutyQueryFactory::new(aggregator.clone(), duty_config.schedule_ids().clone());
            let processor = PostponedCommandProcessor::new(
                duty_config.name(),
                duty_config.token(),
                Arc::new(factory),
                Arc::clone(&cache),
                Arc::clone(&messenger),
            )
            .with_cache_ttl(duty_config.cache_ttl())
            .with_process_timeout(process_timeout);
            manager.add_command_processor(duty_config.name(), Arc::new(processor));

            let digest = DutyDigest::new(
                aggregator,
                duty_config.schedule_ids().clone(),
                config.timelogs_command().team().clone(),
                channel,
                Arc::clone(&messenger),
            );
            scheduler.add_job(duty_config.daily_time()?, Arc::new(digest))?;
        }

        let timelogs_config = config.timelogs_command();
        if *timelogs_config.enable() {
            let aggregator = TimelogAggregator::new(timelog, config.retry().clone());
            let minimum = timelogs_config.minimum_time_logged();
            let team = timelogs_config.team().clone();
            let factory = TimelogQueryFactory::new(aggregator.clone(), team.clone(), minimum);
            let processor = PostponedCommandProcessor::new(
                timelogs_config.name(),
                timelogs_config.token(),
                Arc::new(factory),
                Arc::clone(&cache),
                Arc::clone(&messenger),
            )
            .with_cache_ttl(timelogs_config.cache_ttl())
            .with_process_timeout(process_timeout);
            manager.add_command_processor(timelogs_config.name(), Arc::new(processor));

            let digest = TimelogDigest::new(aggregator, team, minimum, channel, Arc::clone(&messenger));
            scheduler.add_job(timelogs_config.daily_time()?, Arc::new(digest))?;
        }

        tracing::info!(commands = ?manager.commands(), jobs = scheduler.len(), "Warden assembled");
        Ok(Self { manager, scheduler })
    }

    /// Shared command manager.
    pub fn manager(&self) -> Arc<CommandProcessManager> {
        Arc::clone(&self.manager)
    }

    /// Router serving the command endpoint.
    pub fn router(&self) -> axum::Router {
        create_router(ApiState::new(self.manager()))
    }

    /// Serve on `listener` and run the daily digests until `shutdown`
    /// resolves, then wait for background work.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> anyhow::Result<()> {
        let scheduler = Arc::clone(&self.scheduler);
        let digests = tokio::spawn(async move { scheduler.run().await });

        tracing::info!(address = %listener.local_addr()?, "Listening for commands");
        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("Shutting down");
        self.scheduler.stop();
        self.manager.shutdown().await;
        if let Err(e) = digests.await {
            tracing::error!(error = %e, "Daily scheduler task failed");
        }
        Ok(())
    }
}
