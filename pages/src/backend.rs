use std::fmt;

use futures::future::{BoxFuture, FutureExt};
use serde_json::Value;
use url::Url;

use crate::error::{PageError, TransportError};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        })
    }
}

/// The JSON-over-HTTP surface of the backend. `path` is relative to the
/// backend root and may carry a query string.
pub trait Backend: Send + Sync {
    fn fetch(&self, method: Method, path: &str, body: Option<Value>) -> BoxFuture<'_, Result<Value, PageError>>;
}

/// A [`Backend`] talking to a real server.
pub struct HttpBackend {
    client: reqwest::Client,
    base: Url,
}

impl HttpBackend {
    /// `base` is the URL the resource paths are resolved against.
    pub fn new(mut base: Url) -> Self {
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        HttpBackend {
            client: reqwest::Client::new(),
            base,
        }
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Resolves `path` below the base URL.
    pub fn url_for(&self, path: &str) -> Result<Url, url::ParseError> {
        self.base.join(path.trim_start_matches('/'))
    }
}

impl Backend for HttpBackend {
    fn fetch(&self, method: Method, path: &str, body: Option<Value>) -> BoxFuture<'_, Result<Value, PageError>> {
        let path = path.to_owned();

        async move {
            let failure = |source: TransportError| PageError::TransportFailure {
                method,
                path: path.clone(),
                source,
            };

            let url = self.url_for(&path).map_err(|e| failure(e.into()))?;

            let request = match method {
                Method::Get => self.client.get(url),
                Method::Post => self.client.post(url),
                Method::Put => self.client.put(url),
                Method::Delete => self.client.delete(url),
            };

            let request = match &body {
                Some(body) => request.json(body),
                None => request,
            };

            let response = request.send().await.map_err(|e| failure(e.into()))?;
            let status = response.status();
            let bytes = response.bytes().await.map_err(|e| failure(e.into()))?;

            if !status.is_success() {
                return Err(failure(TransportError::Status {
                    status: status.as_u16(),
                    message: String::from_utf8_lossy(&bytes).into_owned(),
                }));
            }

            serde_json::from_slice(&bytes).map_err(|source| PageError::Decode {
                path: path.clone(),
                source,
            })
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use url::Url;

    use super::HttpBackend;

    #[test]
    fn paths_resolve_below_base() {
        let backend = HttpBackend::new(Url::parse("http://localhost:3000/api").unwrap());

        assert_eq!(backend.base().as_str(), "http://localhost:3000/api/");
        assert_eq!(
            backend.url_for("/recipe/abc").unwrap().as_str(),
            "http://localhost:3000/api/recipe/abc"
        );
        assert_eq!(
            backend.url_for("/login?username=Moritz").unwrap().as_str(),
            "http://localhost:3000/api/login?username=Moritz"
        );
    }
}
