pub mod composite;
pub mod concentration;
pub mod kpi;
pub mod stats;
