pub mod user_pipeline;

pub use user_pipeline::UserPipeline;
