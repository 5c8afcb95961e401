pub mod config;
pub mod contract;
pub mod document;
pub mod highlighter;
pub mod logging;
pub mod model;
pub mod runtime;
pub mod scheduler;
pub mod search;
pub mod search_box;
pub mod service;
pub mod source;
pub mod transcript;
pub mod transport;
