pub mod charts;
pub mod credentials;
pub mod dashboard;
pub mod filter;
pub mod ingest;

pub use dashboard::{Dashboard, DashboardView, LoginOutcome};
