/// Agent string sent with the pool login, e.g. `stratum-miner/1.0.0 (linux)`
pub fn user_agent() -> String {
    format!(
        "{}/{} ({})",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS
    )
}
