use crate::error::FetchError;

/// GET access to the publication index. Callers await one request at a time.
pub trait Transport {
    async fn get_text(&self, url: &str) -> Result<String, FetchError>;
    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// reqwest-backed transport used by the CLI.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(user_agent: &str) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().user_agent(user_agent).build()?;
        Ok(Self { client })
    }

    async fn send(&self, url: &str) -> Result<reqwest::Response, FetchError> {
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(FetchError::Server {
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp)
    }
}

impl Transport for HttpTransport {
    async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        Ok(self.send(url).await?.text().await?)
    }

    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        Ok(self.send(url).await?.bytes().await?.to_vec())
    }
}
