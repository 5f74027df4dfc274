use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    textcad_cli::main_entry().await
}
