pub mod backup;
pub mod config;
pub mod default_colors;
pub mod export;
pub mod gutendex;
pub mod service;
pub mod store;
pub mod traits;
pub mod types;
