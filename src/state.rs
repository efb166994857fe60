use crate::config::Config;
use crate::domain::ports::{CatalogRepository, CodeRepository, ReservationRepository};
use crate::domain::services::booking_service::BookingService;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub catalog_repo: Arc<dyn CatalogRepository>,
    pub reservation_repo: Arc<dyn ReservationRepository>,
    pub code_repo: Arc<dyn CodeRepository>,
    pub booking_service: Arc<BookingService>,
}
