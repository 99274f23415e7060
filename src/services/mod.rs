pub mod extraction_service;
pub mod host_page;
pub mod model_catalog;
pub mod page_scripts;
pub mod warn_writer;

pub use extraction_service::{ExtractionRequest, ExtractionService};
pub use host_page::{ChromeHostPage, HostPage, PageControl, SelectOption, StatusDisplay, UserCommand};
pub use model_catalog::{ModelCatalog, ModelInfo};
pub use warn_writer::WarnWriter;
