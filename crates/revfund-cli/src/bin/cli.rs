use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    revfund_cli::cli::run().await
}
