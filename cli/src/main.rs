use clap::Parser;
use qjudge_cli::{cmd::Args, logger};

#[tokio::main]
async fn main() {
    logger::init();
    let args = Args::parse();
    args.exec().await.unwrap_or_else(|e| {
        eprintln!("Error: {:?}", e);
        std::process::exit(1);
    });
}
