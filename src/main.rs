#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = writewell_api::run().await {
        eprintln!("writewell-api fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
