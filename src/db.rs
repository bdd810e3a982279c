// src/db.rs

mod client_repo;
mod inspection_repo;
mod intervention_repo;
mod notification_repo;
mod report_repo;
mod sync_repo;
mod user_repo;

pub use client_repo::ClientRepository;
pub use inspection_repo::InspectionRepository;
pub use intervention_repo::InterventionRepository;
pub use notification_repo::NotificationRepository;
pub use report_repo::ReportRepository;
pub use sync_repo::{ServerVersion, SyncRepository};
pub use user_repo::UserRepository;
