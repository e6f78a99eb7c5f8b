use async_trait::async_trait;
use chrono::{DateTime, Utc};
use farelink_shared::airline::AirlineCode;
use farelink_shared::pii::Masked;
use serde_json::Value;

/// Bearer credential minted by the external auth layer. The token itself is
/// masked so it cannot leak through Debug-formatted logs.
#[derive(Debug, Clone)]
pub struct BearerToken {
    pub token: Masked<String>,
    pub expires_at: DateTime<Utc>,
}

impl BearerToken {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Seam to the HTTP/auth collaborator that actually talks to the upstream
/// distribution API. It consumes the airline code this core resolves to pick
/// the backend partition; token acquisition and caching live behind it.
#[async_trait]
pub trait SupplierGateway: Send + Sync {
    /// A currently-valid bearer credential.
    async fn bearer_token(&self) -> Result<BearerToken, GatewayError>;

    /// Routing header value for one airline's backend partition.
    fn routing_header(&self, airline: &AirlineCode) -> String;

    /// POST a scoped request document to an upstream operation endpoint.
    async fn send(
        &self,
        operation: &str,
        airline: &AirlineCode,
        payload: &Value,
    ) -> Result<Value, GatewayError>;
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("upstream rejected request: {status} {message}")]
    Upstream { status: u16, message: String },

    #[error("transport error: {0}")]
    Transport(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_config::RoutingConfig;
    use chrono::Duration;

    struct StubGateway {
        routing: RoutingConfig,
    }

    #[async_trait]
    impl SupplierGateway for StubGateway {
        async fn bearer_token(&self) -> Result<BearerToken, GatewayError> {
            Ok(BearerToken {
                token: "test-token".to_string().into(),
                expires_at: Utc::now() + Duration::minutes(10),
            })
        }

        fn routing_header(&self, airline: &AirlineCode) -> String {
            self.routing.header_for(airline)
        }

        async fn send(
            &self,
            _operation: &str,
            _airline: &AirlineCode,
            payload: &Value,
        ) -> Result<Value, GatewayError> {
            Ok(payload.clone())
        }
    }

    #[tokio::test]
    async fn test_stub_gateway_round_trip() {
        let gateway = StubGateway {
            routing: RoutingConfig::default(),
        };
        let qr = AirlineCode::parse("QR").unwrap();

        let token = gateway.bearer_token().await.unwrap();
        assert!(!token.is_expired(Utc::now()));
        // Token text never reaches Debug output
        assert!(!format!("{:?}", token).contains("test-token"));

        assert_eq!(gateway.routing_header(&qr), "QR");
        let payload = serde_json::json!({ "Query": {} });
        let echoed = gateway.send("flightprice", &qr, &payload).await.unwrap();
        assert_eq!(echoed, payload);
    }

    #[test]
    fn test_token_expiry() {
        let token = BearerToken {
            token: "t".to_string().into(),
            expires_at: Utc::now() - Duration::seconds(1),
        };
        assert!(token.is_expired(Utc::now()));
    }
}
