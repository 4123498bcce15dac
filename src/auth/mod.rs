pub mod extractors;

pub use extractors::{check_bearer, ServiceAuth};
