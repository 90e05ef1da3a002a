// Cover letter generation: prompt construction and the end-to-end pipeline.
// All remote calls go through llm_client; rendering and compilation live in render.

pub mod pipeline;
pub mod prompt_builder;
pub mod prompts;
