#![deny(missing_docs)]
//! Vidrelay core library.
//!
//! URL classification, the yt-dlp extraction adapter, download settings
//! and the error taxonomy shared by the delivery runtime and transports.

/// Supported platform URL recognition.
pub mod classifier;
/// Configuration management.
pub mod config;
/// Delivery error taxonomy.
pub mod error;
/// Media extraction adapters.
pub mod extractor;
/// Download directory and temp file handling.
pub mod fs;
/// Utility functions.
pub mod utils;

pub use classifier::{classify, is_supported_url, Platform};
pub use error::{DeliveryError, FailureKind};
pub use extractor::{ExtractError, ExtractedMedia, MediaExtractor};
