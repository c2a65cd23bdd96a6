//! Storage module for uploaded files
//!
//! Provides a local-disk file store rooted at the configured media directory,
//! with staged writes that are only committed once the owning record exists.

mod local_store;

pub use local_store::{
    record_file_name, record_file_name_with_ext, storage_basename, LocalFileStore, StagedFile,
};
