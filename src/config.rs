use std::env;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub notify_service_url: String,
    pub notify_service_token: String,
    pub jwt_public_key: String, // Public key (PEM)
    pub auth_audience: String,
    pub cron_secret: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            port: env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().expect("PORT must be a number"),
            notify_service_url: env::var("NOTIFY_SERVICE_URL").unwrap_or_else(|_| "http://localhost:8000/api/v1/push".to_string()),
            notify_service_token: env::var("NOTIFY_SERVICE_TOKEN").unwrap_or_else(|_| "test-token-1".to_string()),
            jwt_public_key: env::var("JWT_PUBLIC_KEY").expect("JWT_PUBLIC_KEY must be set (Ed25519 Public Key)"),
            auth_audience: env::var("AUTH_AUDIENCE").unwrap_or_else(|_| "custody-frontend".to_string()),
            cron_secret: env::var("CRON_SECRET").expect("CRON_SECRET must be set"),
        }
    }
}
