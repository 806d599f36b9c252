//! OmniFix: PC repair assistant
//!
//! Diagnoses free-text problem descriptions and builds repair plans. An
//! external AI backend is asked first; when it is unavailable, answers come
//! from a small local knowledge catalog.

pub mod assistant;
pub mod cli;
pub mod core;
pub mod knowledge;
