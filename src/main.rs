#[rocket::main]
async fn main() -> Result<(), rocket::Error> {
    let _rocket = cloudtodo::rocket_from_env().launch().await?;
    Ok(())
}
