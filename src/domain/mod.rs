//! Input sanitation and DNS resolution for lookup targets.

pub mod dns;
pub mod normalize;

pub use dns::{resolve, HostResolver, ResolveFailure, SystemResolver};
pub use normalize::{is_valid_domain_format, normalize};
