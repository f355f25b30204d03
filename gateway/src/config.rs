//! API gateway configuration.
//!
//! The HMAC watermark secret and the HTTP listen address are read here; the
//! auth-layer variables (`AUTH_LOGIN_URL`, `JWT_SECRET_KEY`, `JWT_ISSUER`)
//! and `ALLOWED_ORIGIN` belong to an enclosing auth/CORS layer this demo
//! does not implement, and are read only for presence-logging.

use std::net::SocketAddr;

use auroraa_core::AuroraaSecret;

/// Configuration for the watermark gateway HTTP server.
#[derive(Clone)]
pub struct GatewayConfig {
    /// Address to bind the HTTP server to.
    pub listen_addr: SocketAddr,
    /// Address to bind the Prometheus `/metrics` exporter to.
    pub metrics_addr: SocketAddr,
    /// HMAC key `K` used by every embed/verify call.
    pub secret: AuroraaSecret,
}

impl GatewayConfig {
    /// Loads configuration from the environment. The watermark secret is
    /// required; its absence or a too-short value is a fatal startup error.
    pub fn from_env() -> Result<Self, auroraa_core::CoreError> {
        let secret = AuroraaSecret::from_env()?;

        for var in ["AUTH_LOGIN_URL", "JWT_SECRET_KEY", "JWT_ISSUER", "ALLOWED_ORIGIN"] {
            match std::env::var(var) {
                Ok(_) => tracing::info!(variable = var, "auth/CORS config variable present"),
                Err(_) => tracing::debug!(variable = var, "auth/CORS config variable not set"),
            }
        }

        let listen_addr: SocketAddr = "0.0.0.0:8081"
            .parse()
            .expect("hard-coded gateway listen address should parse");
        let metrics_addr: SocketAddr = "0.0.0.0:9898"
            .parse()
            .expect("hard-coded metrics listen address should parse");

        Ok(Self {
            listen_addr,
            metrics_addr,
            secret,
        })
    }
}
