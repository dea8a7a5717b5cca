//! Wire types exchanged with the inference backend.
//!
//! The relay only ever sends a single user turn, but the payload keeps the
//! `messages` array shape that Ollama's chat endpoint expects.
pub mod message;
