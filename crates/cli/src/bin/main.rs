use tapster_diagnostics::Result;

#[tokio::main(flavor = "multi_thread")]
pub async fn main() -> Result<()> {
    tapster_cli::run_cli().await
}
