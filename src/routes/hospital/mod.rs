mod handler;
mod model;

pub use handler::{
    dashboard,
    login,
    process_donation,
    register,
    resend_registration_otp,
    upsert_stock,
    verify_registration,
};
