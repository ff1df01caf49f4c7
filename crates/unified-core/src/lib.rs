pub mod convert;
pub mod error;
pub mod extract;
pub mod framework;
pub mod governance;
pub mod guidance;
pub mod mcp_api;
pub mod model;
pub mod normalize;
pub mod pipeline;
