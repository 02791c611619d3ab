//! Integration tests for the Storyloom generation pipeline

mod config_integration;
mod pipeline_run;
mod storage_export;
mod template_catalog;
mod test_utils;
