//! Domain entities - the core business objects.

mod api_application;
mod organization;
mod page;
mod requestor;
mod window;

pub use api_application::ApiApplication;
pub use organization::Organization;
pub use page::PageDescriptor;
pub use requestor::{QuotaClass, QuotaPolicy, Requestor};
pub use window::RateWindow;
