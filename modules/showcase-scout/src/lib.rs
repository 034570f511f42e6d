pub mod classifier;
pub mod digest;
pub mod engagement;
pub mod filters;
pub mod maintenance;
pub mod pipeline;
pub mod profiles;
pub mod sources;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
pub mod traits;
