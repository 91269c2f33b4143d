#[tokio::main]
async fn main() -> anyhow::Result<()> {
    patchy::run().await
}
