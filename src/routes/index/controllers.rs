use rocket::{get, response::content::RawHtml, routes, Build, Rocket};

const INDEX_HTML: &str = include_str!("../../../static/index.html");

pub fn register_routes(rocket: Rocket<Build>) -> Rocket<Build> {
    rocket.mount("/", routes![index])
}

#[get("/")]
fn index() -> RawHtml<&'static str> {
    RawHtml(INDEX_HTML)
}
