// src/services.rs

pub mod auth;
pub mod client_service;
pub mod document_service;
pub mod geo_service;
pub mod inspection_service;
pub mod intervention_service;
pub mod notification_service;
pub mod report_service;
pub mod sync_service;
