// Library for tests to access modules

pub mod aggregator;
pub mod config;
pub mod error;
pub mod models;
pub mod readers;
pub mod routes;
