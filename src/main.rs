//! Binary entry point; all app logic lives in the library.

#[tokio::main]
async fn main() {
    if let Err(e) = ncc_backend::run().await {
        eprintln!("ncc-backend: {}", e);
        std::process::exit(1);
    }
}
