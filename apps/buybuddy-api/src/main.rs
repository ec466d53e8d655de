use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = buybuddy_api::Args::parse();

	buybuddy_api::run(args).await
}
