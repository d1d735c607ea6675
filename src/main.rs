#[tokio::main]
async fn main() {
    custody_backend::run().await;
}
