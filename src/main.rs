#[tokio::main]
async fn main() {
    petsit_backend::run().await;
}
