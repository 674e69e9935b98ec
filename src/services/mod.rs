pub mod api_client;
pub mod chart;
pub mod dashboard_service;
pub mod detail_table;
pub mod export_service;
pub mod filter_service;
pub mod session_service;
