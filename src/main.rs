#[tokio::main]
async fn main() {
    if let Err(e) = marketplace_admin_lib::run().await {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
