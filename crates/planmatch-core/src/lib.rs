#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod config;
pub mod error;
pub mod ingest;
pub mod loader;
pub mod traits;
pub mod types;
pub mod validator;
