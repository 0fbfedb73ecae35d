pub mod client;
pub mod fetcher;
pub mod reverse;
pub mod source;

pub use client::{FhirClient, FhirClientConfig};
pub use fetcher::{ResourceFetcher, ReverseMatches};
pub use reverse::{ReverseReferenceRegistry, ReverseSearchParam};
pub use source::{ResourceSource, SourceError};
