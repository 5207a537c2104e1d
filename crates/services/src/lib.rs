pub mod backend;
pub mod config;
pub mod http;

pub use backend::{RecordRequest, RecordResponse, TranscriptionBackend, TransportError, UploadResponse};
pub use config::BackendConfig;
pub use http::HttpBackend;
