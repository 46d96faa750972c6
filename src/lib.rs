pub mod cli;
pub mod config;
pub mod ctx;
pub mod error;
pub mod feed;
pub mod io;
pub mod math;
pub mod pipeline;
pub mod schema;
pub mod scores;
pub mod signals;
