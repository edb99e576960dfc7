pub mod api_application;
pub mod organization;
