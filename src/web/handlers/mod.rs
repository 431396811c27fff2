pub mod pipeline_handlers;
pub mod service_handlers;
pub mod system_handlers;

pub use pipeline_handlers::*;
pub use service_handlers::*;
pub use system_handlers::*;
