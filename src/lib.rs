// Library for tests to access modules

pub mod aggregator;
pub mod config;
pub mod format;
pub mod local_stats;
pub mod metrics;
pub mod models;
pub mod notifications;
pub mod refresh;
pub mod routes;
pub mod service;
pub mod session_repo;
pub mod sources;
pub mod state;
pub mod visibility;
pub mod worker;
