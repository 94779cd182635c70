//! Adapters to the outside world: the REST API and the Gemini client.

pub mod gemini;
pub mod rest;
