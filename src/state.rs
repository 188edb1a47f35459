use std::sync::Arc;

use crate::config::settings::AppConfig;
use crate::infrastructure::aria2::RemoteDownloads;
use crate::infrastructure::torrent::TransferEngine;
use crate::modules::conversion::service::JobManager;
use crate::workers::aggregator::StateAggregator;
use crate::ws::{Broadcaster, CommandDispatcher};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub jobs: Arc<JobManager>,
    pub torrents: Arc<dyn TransferEngine>,
    pub downloads: Arc<dyn RemoteDownloads>,
    pub broadcaster: Broadcaster,
    pub aggregator: StateAggregator,
    pub commands: CommandDispatcher,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        jobs: Arc<JobManager>,
        torrents: Arc<dyn TransferEngine>,
        downloads: Arc<dyn RemoteDownloads>,
        broadcaster: Broadcaster,
    ) -> Self {
        let aggregator = StateAggregator::new(jobs.clone(), torrents.clone(), downloads.clone());
        let commands = CommandDispatcher::new(torrents.clone(), downloads.clone());
        Self {
            config,
            jobs,
            torrents,
            downloads,
            broadcaster,
            aggregator,
            commands,
        }
    }
}
