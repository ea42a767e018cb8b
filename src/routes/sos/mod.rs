mod handler;
mod model;

pub use handler::{create_alert, list_responses, respond_to_alert};
