//! Sign-in redirect construction.

use axum::body::Body;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use url::Url;

use crate::config::IdentityConfig;

/// Builds redirects to the sign-in entry point that return the user to
/// where they were going.
#[derive(Debug, Clone)]
pub struct SignInRedirect {
    sign_in_url: Url,
    return_to_param: String,
    public_origin: Option<Url>,
}

impl SignInRedirect {
    pub fn new(sign_in_url: Url, return_to_param: impl Into<String>, public_origin: Option<Url>) -> Self {
        Self {
            sign_in_url,
            return_to_param: return_to_param.into(),
            public_origin,
        }
    }

    /// Build from configuration. URLs are checked during validation.
    pub fn from_config(config: &IdentityConfig) -> Result<Self, url::ParseError> {
        let sign_in_url = Url::parse(&config.sign_in_url)?;
        let public_origin = config.public_origin.as_deref().map(Url::parse).transpose()?;
        Ok(Self::new(sign_in_url, config.return_to_param.clone(), public_origin))
    }

    /// Value of the return-to parameter for a requested path.
    ///
    /// With a public origin the result always stays on that origin, even
    /// for paths like `//other.host/x`.
    pub fn return_to(&self, path_and_query: &str) -> String {
        let Some(origin) = &self.public_origin else {
            return path_and_query.to_string();
        };

        let (path, query) = match path_and_query.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (path_and_query, None),
        };
        let mut url = origin.clone();
        url.set_path(path);
        url.set_query(query);
        url.set_fragment(None);
        url.into()
    }

    /// Full sign-in URL carrying the return-to parameter.
    pub fn location(&self, path_and_query: &str) -> Url {
        let mut url = self.sign_in_url.clone();
        url.query_pairs_mut()
            .append_pair(&self.return_to_param, &self.return_to(path_and_query));
        url
    }

    /// `302 Found` pointing at the sign-in entry point.
    pub fn response(&self, path_and_query: &str) -> Response {
        let location = self.location(path_and_query);
        match HeaderValue::from_str(location.as_str()) {
            Ok(value) => {
                let mut response = Response::new(Body::empty());
                *response.status_mut() = StatusCode::FOUND;
                response.headers_mut().insert(header::LOCATION, value);
                response
            }
            Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}
