use std::env;

/// Fallback signing secret for local development only. `Config::from_env`
/// refuses to start a production process without an explicit `JWT_SECRET`.
const DEV_TOKEN_SECRET: &str = "todohive-dev-secret-do-not-use-in-production";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

pub struct Config {
    pub database_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub cors_origin: String,
    pub token_secret: String,
    pub environment: Environment,
}

impl Config {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") => Environment::Production,
            _ => Environment::Development,
        };

        let token_secret = match env::var("JWT_SECRET") {
            Ok(secret) => secret,
            Err(_) => {
                if environment == Environment::Production {
                    panic!("JWT_SECRET must be set when APP_ENV=production");
                }
                log::warn!("JWT_SECRET not set, using the development default");
                DEV_TOKEN_SECRET.to_string()
            }
        };

        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .expect("SERVER_PORT must be a number"),
            cors_origin: env::var("CORS_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            token_secret,
            environment,
        }
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}
