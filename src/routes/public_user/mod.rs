mod handler;
mod model;

pub use handler::{
    dashboard,
    login,
    register,
    resend_login_otp,
    resend_registration_otp,
    verify_login,
    verify_registration,
};
