use rocket::request::{FromRequest, Outcome, Request};
use std::convert::Infallible;

/// The scheme and authority the client used to reach the server,
/// e.g. `http://localhost:3000`. Used to build absolute file URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOrigin {
    pub base_url: String,
}

impl RequestOrigin {
    pub fn url_for(&self, prefix: &str, filename: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_url,
            prefix,
            urlencoding::encode(filename)
        )
    }

    pub fn view_url(&self, filename: &str) -> String {
        self.url_for("files", filename)
    }

    pub fn download_url(&self, filename: &str) -> String {
        self.url_for("download", filename)
    }
}

fn parse_forwarded_proto(header: &str) -> Option<&str> {
    let proto = header.split(',').next()?.trim();

    if proto.eq_ignore_ascii_case("http") || proto.eq_ignore_ascii_case("https") {
        Some(proto)
    } else {
        None
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for RequestOrigin {
    type Error = Infallible;

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let scheme = request
            .headers()
            .get_one("X-Forwarded-Proto")
            .and_then(parse_forwarded_proto)
            .unwrap_or("http")
            .to_ascii_lowercase();

        let host = match (request.host(), request.headers().get_one("Host")) {
            (Some(host), _) => host.to_string(),
            (None, Some(host)) if !host.trim().is_empty() => host.trim().to_owned(),
            _ => {
                let config = request.rocket().config();
                format!("{}:{}", config.address, config.port)
            }
        };

        Outcome::Success(RequestOrigin {
            base_url: format!("{}://{}", scheme, host),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_forwarded_proto() {
        assert_eq!(parse_forwarded_proto("https"), Some("https"));
        assert_eq!(parse_forwarded_proto("https, http"), Some("https"));
        assert_eq!(parse_forwarded_proto(" HTTP "), Some("HTTP"));
        assert_eq!(parse_forwarded_proto("gopher"), None);
    }

    #[test]
    fn test_urls_are_built_from_origin() {
        let origin = RequestOrigin {
            base_url: "http://localhost:3000".to_owned(),
        };

        assert_eq!(
            origin.view_url("a-1-2.txt"),
            "http://localhost:3000/files/a-1-2.txt"
        );
        assert_eq!(
            origin.download_url("my file-1-2.txt"),
            "http://localhost:3000/download/my%20file-1-2.txt"
        );
    }
}
