use brewhub_backend::settings::Settings;

#[rocket::launch]
fn rocket() -> _ {
    dotenv::dotenv().ok();

    let settings = match Settings::new() {
        Ok(settings) => settings,
        Err(err) => panic!("Couldn't load settings: {}", err),
    };

    brewhub_backend::rocket(settings)
}
