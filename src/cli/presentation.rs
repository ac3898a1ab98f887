//! CLI presentation: text and json formatters per command family.

mod batch;
mod shared;
mod status;

pub use batch::{format_batch_output, format_export_output};
pub use shared::format_section_heading;
pub use status::{format_status_output, StatusReport, StatusRow};
