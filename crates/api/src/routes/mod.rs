//! HTTP route handlers.

pub mod associados;
pub mod boletins;
pub mod estatisticas;
pub mod health;
pub mod metrics;
pub mod reservas;
pub mod taxas;

use domain::FacilityConfig;
use std::sync::Arc;
use store::Store;
use workflow::{BulletinBoard, Clock, MemberDirectory, ReservationWorkflow};

/// Shared application state accessible from all handlers.
pub struct AppState<S> {
    pub directory: MemberDirectory<S>,
    pub workflow: ReservationWorkflow<S>,
    pub board: BulletinBoard<S>,
}

impl<S: Store> AppState<S> {
    /// Wires the services over a shared store and clock.
    pub fn new(store: Arc<S>, config: FacilityConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            directory: MemberDirectory::new(store.clone()),
            workflow: ReservationWorkflow::new(store.clone(), config, clock.clone()),
            board: BulletinBoard::new(store, clock),
        }
    }
}
