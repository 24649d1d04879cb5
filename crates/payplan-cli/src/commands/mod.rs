pub mod analysis;
pub mod export;
pub mod npv;
pub mod report;
pub mod scenarios;
pub mod schedule;
