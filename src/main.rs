#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = ops_dashboard_lib::run().await {
        eprintln!("Error: {}", e);
        eprintln!("{}", e.recovery_suggestion());
        std::process::exit(1);
    }
}
