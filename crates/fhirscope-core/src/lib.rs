pub mod extract;
pub mod reference;

pub use extract::{ReferenceInfo, extract_references};
pub use reference::{ParsedReference, UnresolvableReference, is_resolvable, parse_reference};
