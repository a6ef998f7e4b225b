use bankfetch_cli::{build_state, init_tracing, run, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env();
    init_tracing(config.as_ref().map(|c| c.log_format).unwrap_or_default());
    let config = config.map_err(boundary_error)?;

    let state = build_state(&config).await.map_err(boundary_error)?;
    let summary = run(&state, &config).await.map_err(boundary_error)?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

/// Puts the boundary code in front of the error chain printed on exit.
fn boundary_error(err: bankfetch_core::Error) -> anyhow::Error {
    let code = err.boundary_code();
    tracing::error!("{}: {}", code, err);
    anyhow::Error::new(err).context(code)
}
