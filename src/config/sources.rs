//! Configuration sources, applied in this order:
//! global file, workspace files, `QUILL_*` environment, credential variables.

pub mod environment;
pub mod global_file;
pub mod workspace_file;
