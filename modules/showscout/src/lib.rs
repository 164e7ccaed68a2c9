pub mod enrich;
pub mod extract;
pub mod filter;
pub mod normalize;
pub mod pipeline;
pub mod publish;
pub mod renderer;
pub mod targets;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
