//! Services - one method per boundary operation
//!
//! Each service holds its own handle to the store; there is no global
//! connection.

pub mod advisories;
pub mod registry;

pub use advisories::AdvisoryService;
pub use registry::VersionRegistry;
