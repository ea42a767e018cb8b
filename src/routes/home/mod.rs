mod handler;

pub use handler::{index, logout, not_found};
