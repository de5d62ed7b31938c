//! Product finder - identifies a product from a photo and points at where to buy it
//!
//! An uploaded image is sent to the Gemini multimodal API with a prompt; the
//! model's answer is parsed into Amazon search links, a list of candidate
//! listings, or a single redirect target depending on the endpoint.

pub mod ai;
pub mod app;
pub mod encoding;
pub mod error;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod prompts;
pub mod server;
pub mod shaper;

pub use error::{Error, Result};
