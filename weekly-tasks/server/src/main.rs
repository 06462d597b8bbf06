#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().init();
    let config = weekly_tasks_server::config::Config::from_env()?;
    weekly_tasks_server::web::start_web_server(config).await
}
