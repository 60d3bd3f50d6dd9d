use rankpulse_lib::config::AppConfig;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env();
    match rankpulse_lib::run_daily(&config).await {
        Ok(report) => match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                log::error!("failed to serialize report: {e}");
                std::process::exit(1);
            }
        },
        Err(e) => {
            log::error!("snapshot run failed: {e}");
            std::process::exit(1);
        }
    }
}
