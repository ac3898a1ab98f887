//! Integration tests for the Quill article generation pipeline


mod cli_commands;
mod config_integration;
mod image_resolution;
mod pipeline_end_to_end;
mod provider_http;
mod regeneration;
mod store_integration;
