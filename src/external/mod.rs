pub mod price_provider;
pub mod forum_provider;
pub mod yahoofinance;
pub mod reddit;
