//! Report Processing Gateway.
//!
//! Thin delegation layer over the external text-completion and
//! speech-synthesis services. Every operation converts success or failure
//! into the uniform [`GatewayResponse`] shape; no error escapes past this
//! boundary.

pub mod answer;
pub mod simplify;
pub mod speech;
pub mod translate;

pub use answer::answer_question;
pub use simplify::simplify_report;
pub use speech::synthesize_speech;
pub use translate::translate_report;

/// Uniform gateway result: exactly one of `data` or `error` is set.
#[derive(Debug)]
pub struct GatewayResponse<T> {
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> GatewayResponse<T> {
    pub fn from_result(result: anyhow::Result<T>) -> Self {
        match result {
            Ok(data) => Self {
                data: Some(data),
                error: None,
            },
            Err(e) => Self {
                data: None,
                error: Some(e.to_string()),
            },
        }
    }

    pub fn into_result(self) -> Result<T, String> {
        match (self.data, self.error) {
            (Some(data), _) => Ok(data),
            (None, Some(error)) => Err(error),
            (None, None) => Err("gateway returned no data".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn success_sets_data_only() {
        let response = GatewayResponse::from_result(Ok(42));
        assert_eq!(response.data, Some(42));
        assert!(response.error.is_none());
    }

    #[test]
    fn failure_sets_error_only() {
        let response: GatewayResponse<i32> = GatewayResponse::from_result(Err(anyhow!("boom")));
        assert!(response.data.is_none());
        assert_eq!(response.error.as_deref(), Some("boom"));
    }

    #[test]
    fn into_result_roundtrip() {
        assert_eq!(GatewayResponse::from_result(Ok(1)).into_result(), Ok(1));
        assert_eq!(
            GatewayResponse::<i32>::from_result(Err(anyhow!("bad"))).into_result(),
            Err("bad".to_string())
        );
    }
}
