// src/models.rs

pub mod auth;
pub mod clients;
pub mod geo;
pub mod inspections;
pub mod interventions;
pub mod notifications;
pub mod reports;
pub mod sync;
