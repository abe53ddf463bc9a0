//! Company directory scraper with an optional unsolicited-application workflow

pub mod application;
pub mod config;
pub mod context;
pub mod database;
pub mod discovery;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod ledger;
pub mod models;
pub mod selectors;
pub mod telemetry;
pub mod traits;
