pub mod attribution_service;
pub mod derivation_service;
pub mod portfolio_service;
pub mod report_service;
