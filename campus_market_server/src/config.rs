use std::env;

use campus_market_engine::traits::{PenaltyPolicy, RefundPolicy};
use chrono::Duration;
use log::*;
use paystack_tools::PaystackConfig;

const DEFAULT_CM_HOST: &str = "127.0.0.1";
const DEFAULT_CM_PORT: u16 = 4460;
const DEFAULT_AUTO_SUSPEND_POINTS: i64 = 10;
const DEFAULT_AUTO_SUSPEND_DAYS: i64 = 7;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// How buyer-favour refunds behave once an order has settled. `deny` rejects them; anything
    /// else debits the seller's available balance.
    pub refund_policy: RefundPolicy,
    pub penalty_policy: PenaltyPolicy,
    pub paystack: PaystackConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_CM_HOST.to_string(),
            port: DEFAULT_CM_PORT,
            database_url: String::default(),
            refund_policy: RefundPolicy::default(),
            penalty_policy: PenaltyPolicy {
                auto_suspend_at: Some(DEFAULT_AUTO_SUSPEND_POINTS),
                suspension: Duration::days(DEFAULT_AUTO_SUSPEND_DAYS),
            },
            paystack: PaystackConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_env_or_default() -> Self {
        let host = env::var("CM_HOST").unwrap_or_else(|_| DEFAULT_CM_HOST.to_string());
        let port = env::var("CM_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or_else(|| {
                info!("CM_PORT not set or invalid. Using the default, {DEFAULT_CM_PORT}");
                DEFAULT_CM_PORT
            });
        let database_url = campus_market_engine::sqlite::db::db_url();
        let refund_policy = match env::var("CM_REFUND_SETTLED").as_deref() {
            Ok("deny") => RefundPolicy::DenySettled,
            _ => RefundPolicy::DebitAvailable,
        };
        let auto_suspend_at = match env::var("CM_AUTO_SUSPEND_POINTS").as_deref() {
            Ok("off") => None,
            Ok(v) => v.parse().ok().or(Some(DEFAULT_AUTO_SUSPEND_POINTS)),
            Err(_) => Some(DEFAULT_AUTO_SUSPEND_POINTS),
        };
        let suspension_days = env::var("CM_AUTO_SUSPEND_DAYS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_AUTO_SUSPEND_DAYS);
        let penalty_policy =
            PenaltyPolicy { auto_suspend_at, suspension: Duration::days(suspension_days) };
        let paystack = PaystackConfig::new_from_env_or_default();
        Self { host, port, database_url, refund_policy, penalty_policy, paystack }
    }
}
