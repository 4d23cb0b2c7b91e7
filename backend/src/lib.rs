//! Image labeling service: uploads are normalized to JPEG, stored in S3, labeled by
//! Rekognition and answered with a time-limited link to the stored result record

#![deny(clippy::all, clippy::pedantic, clippy::nursery, missing_docs)]

/// Label detection via Rekognition
pub mod label_detection;

/// S3 content store
pub mod media_storage;

/// Upload pipeline: validate, normalize, store, classify, link
pub mod pipeline;

/// HTTP routes
pub mod routes;

/// Server startup
pub mod server;

/// HTML pages
pub mod templates;

/// Shared types
pub mod types;
