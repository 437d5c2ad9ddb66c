pub mod config;
pub mod delivery;
pub mod dispatcher;
pub mod extractor;
pub mod fetcher;
pub mod health;
pub mod report;
pub mod scan;
