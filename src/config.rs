// config.rs
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_maxage: i64,
    pub port: u16,
    // Payout rail configuration
    pub paystack_secret_key: String,
    pub payout_base_url: String,
}

impl Config {
    pub fn init() -> Config {
        let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let jwt_secret = std::env::var("JWT_SECRET_KEY").expect("JWT_SECRET_KEY must be set");
        let jwt_maxage = std::env::var("JWT_MAXAGE").expect("JWT_MAXAGE must be set");

        // Payout rail configuration (with defaults for local runs)
        let paystack_secret_key = std::env::var("PAYSTACK_SECRET_KEY")
            .unwrap_or_else(|_| "test_secret_key".to_string());
        let payout_base_url = std::env::var("PAYOUT_BASE_URL")
            .unwrap_or_else(|_| "https://api.paystack.co".to_string());

        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(8000);

        Config {
            database_url,
            jwt_secret,
            jwt_maxage: jwt_maxage.parse::<i64>().unwrap(),
            port,
            paystack_secret_key,
            payout_base_url,
        }
    }
}
