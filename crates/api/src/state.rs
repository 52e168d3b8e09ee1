use std::sync::Arc;

use jejuqa_core::adoption::AdoptionService;
use jejuqa_core::badges::{BadgeCheckQueue, BadgeEvaluator};
use jejuqa_core::notify::ActivityNotifier;
use jejuqa_core::points::PointLedger;
use jejuqa_core::store::CommunityStore;

use crate::config::ServerConfig;

/// The domain services, built once at startup around one store.
#[derive(Clone)]
pub struct Services {
    pub adoption: AdoptionService,
    pub ledger: PointLedger,
    pub badges: BadgeEvaluator,
}

impl Services {
    pub fn new(
        store: Arc<dyn CommunityStore>,
        config: &ServerConfig,
        badge_queue: BadgeCheckQueue,
        notifier: Arc<dyn ActivityNotifier>,
    ) -> Self {
        let adoption = AdoptionService::new(Arc::clone(&store))
            .with_policy(config.adoption)
            .with_badge_queue(badge_queue)
            .with_notifier(Arc::clone(&notifier));
        Self {
            adoption,
            ledger: PointLedger::new(Arc::clone(&store)),
            badges: BadgeEvaluator::new(store, notifier),
        }
    }
}

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub store: Arc<dyn CommunityStore>,
    pub services: Services,
}
