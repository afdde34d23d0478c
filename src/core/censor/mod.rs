// Core censor module - image moderation business logic.

pub mod censor_models;
pub mod censor_plugin;
pub mod censor_service;
pub mod render_pipeline;

pub use censor_models::*;
pub use censor_plugin::*;
pub use censor_service::*;
pub use render_pipeline::*;
