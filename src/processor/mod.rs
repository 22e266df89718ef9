pub mod meta_tags;
pub mod patterns;
pub mod policy;
pub mod spec_normalizer;

pub use meta_tags::*;
pub use patterns::*;
pub use policy::*;
pub use spec_normalizer::*;
