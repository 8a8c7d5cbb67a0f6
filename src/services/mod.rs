pub mod api;
pub mod controller;
pub mod export;
pub mod state;
pub mod summary;
