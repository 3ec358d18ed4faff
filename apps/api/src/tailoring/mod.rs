// Resume tailoring: job details extraction, prompt building, the model call and
// markdown cleanup. All model calls go through llm_client.

pub mod analysis;
pub mod cleanup;
pub mod handlers;
pub mod job_details;
pub mod prompts;
pub mod service;
