// AWS Lambda binary entry point
//
// Build with: cargo build -p kinesis2s3-lambda --release

#[tokio::main]
async fn main() -> Result<(), lambda_runtime::Error> {
    kinesis2s3_lambda::run().await
}
