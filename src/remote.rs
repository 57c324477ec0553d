use async_trait::async_trait;
use reqwest::Client;

use crate::error::QuoteError;
use crate::quote::Quote;

/// Read/write access to the remote quote collection.
///
/// The wire shape is `{text, category}` in both directions; a post returns
/// the record as the server stored it.
#[async_trait]
pub trait RemoteSource: Send + Sync {
    async fn fetch_quotes(&self) -> Result<Vec<Quote>, QuoteError>;
    async fn post_quote(&self, quote: &Quote) -> Result<Quote, QuoteError>;
}

#[derive(Clone)]
pub struct RemoteClient {
    client: Client,
    base_url: String,
}

impl RemoteClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn quotes_url(&self) -> String {
        format!("{}/quotes", self.base_url)
    }
}

#[async_trait]
impl RemoteSource for RemoteClient {
    async fn fetch_quotes(&self) -> Result<Vec<Quote>, QuoteError> {
        let response = self.client.get(self.quotes_url()).send().await?;

        if !response.status().is_success() {
            return Err(QuoteError::Status(response.status().as_u16()));
        }

        let quotes: Vec<Quote> = response.json().await?;
        Ok(quotes)
    }

    async fn post_quote(&self, quote: &Quote) -> Result<Quote, QuoteError> {
        let response = self
            .client
            .post(self.quotes_url())
            .json(quote)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(QuoteError::Status(response.status().as_u16()));
        }

        let echoed: Quote = response.json().await?;
        Ok(echoed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quotes_url_joins_cleanly() {
        let client = RemoteClient::new("http://localhost:3000");
        assert_eq!(client.quotes_url(), "http://localhost:3000/quotes");

        let trailing = RemoteClient::new("http://localhost:3000/");
        assert_eq!(trailing.quotes_url(), "http://localhost:3000/quotes");
    }
}
