use axum::Json;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Uniform API response envelope
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Error code, 0 on success
    pub code: i32,
    /// Localized message, "success" on success
    pub msg: String,
    /// Response data, None on error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resp_data: Option<T>,
}

/// Empty response type for APIs with no payload
#[derive(Debug, Serialize, Deserialize)]
pub struct EmptyResponse {}

pub fn success_to_api_response<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        code: 0,
        msg: "success".into(),
        resp_data: Some(data),
    })
}

pub fn error_to_api_response<T>(code: i32, msg: String) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        code,
        msg,
        resp_data: None,
    })
}

pub mod error_codes {
    pub const SUCCESS: i32 = 0;
    pub const VALIDATION_ERROR: i32 = 1000;
    pub const ALREADY_EXISTS: i32 = 1001;
    pub const AUTH_FAILED: i32 = 1002;
    pub const PERMISSION_DENIED: i32 = 1003;
    pub const NOT_FOUND: i32 = 1004;
    pub const OTP_EXPIRED: i32 = 1005;
    pub const INTERNAL_ERROR: i32 = 5000;
}

/// Generates a 6-digit one-time code, 100000..=999999.
pub fn generate_otp_code() -> String {
    let mut rng = rand::thread_rng();
    rng.gen_range(100_000..=999_999).to_string()
}

pub fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn otp_code_is_six_digits() {
        for _ in 0..50 {
            let code = generate_otp_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
            assert_ne!(code.chars().next(), Some('0'));
        }
    }

    #[test]
    fn digit_validation() {
        assert!(is_digits("9876543210", 10));
        assert!(!is_digits("98765", 10));
        assert!(!is_digits("98765d3210", 10));
        assert!(is_digits("123456789012", 12));
    }
}
