pub mod object_store;
pub mod record_store;
pub mod transient_file;

pub use object_store::{LocalObjectStore, ObjectStore};
pub use record_store::{JsonFileRecordStore, RecordStore};
pub use transient_file::TransientDocument;
