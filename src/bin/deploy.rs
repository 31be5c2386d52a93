//! Resolve the Cloudflare account and make sure the Pages project exists.

use ops_dashboard_lib::cloudflare::client::CloudflareClient;
use ops_dashboard_lib::state::load_config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = load_config()
        .map_err(|e| anyhow::anyhow!("Failed to load config: {e}"))?
        .cloudflare;
    let client = CloudflareClient::new(config.token()?);

    println!("Getting accounts...");
    let account = client
        .first_account()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to get accounts: {e}"))?;
    println!("Account ID: {}", account.id);

    println!("Getting/creating project...");
    let project = client
        .get_or_create_project(&account.id, &config.project_name, &config.production_branch)
        .await?;
    println!("Project: {}", project.name);
    if let Some(pattern) = project.url_pattern() {
        println!("Deployment URL pattern: {}", pattern);
    }

    Ok(())
}
