#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    rent_invoice_server::run().await
}
