pub mod dashboard;
pub mod export;
pub mod flatten;
pub mod insurance;
pub mod reconcile;

pub use dashboard::{AppointmentDashboardService, PatientDashboardService};
