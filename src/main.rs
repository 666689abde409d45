use anyhow::Result;

use scholarship_screening::utils::logging;
use scholarship_screening::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载 .env（不存在时忽略）
    dotenvy::dotenv().ok();

    // 加载配置
    let config = Config::from_env()?;

    // 初始化日志
    logging::init(config.verbose_logging);

    // 初始化并运行应用
    App::initialize(config).await?.run().await?;

    Ok(())
}
