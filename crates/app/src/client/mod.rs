mod cache;

use api_types::{
    account::AccountView,
    currency::CurrencyView,
    response::{ErrorMessage, Success},
    transaction::{TransactionDetail, TransactionRequest},
    user::{Login, LoginResponse},
};
use reqwest::{Response, Url};
use serde::de::DeserializeOwned;

use crate::error::{AppError, Result};

pub use cache::{Collection, QueryCache, QueryKey};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("not logged in")]
    Unauthorized,
    #[error("not found")]
    NotFound,
    #[error("rejected: {0}")]
    BadRequest(String),
    #[error("server error: {0}")]
    Server(String),
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),
}

type ClientResult<T> = std::result::Result<T, ClientError>;

#[derive(Debug)]
pub struct Client {
    base_url: Url,
    http: reqwest::Client,
    cache: QueryCache,
}

impl Client {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|err| AppError::Invalid(format!("invalid base_url: {err}")))?;
        let http = reqwest::Client::builder().cookie_store(true).build()?;
        Ok(Self {
            base_url,
            http,
            cache: QueryCache::default(),
        })
    }

    fn endpoint(&self, path: &str) -> ClientResult<Url> {
        self.base_url
            .join(path)
            .map_err(|err| ClientError::Server(format!("invalid base_url: {err}")))
    }

    /// Opens a session; the cookie is kept by the HTTP client.
    pub async fn login(&self, username: &str, password: &str) -> ClientResult<()> {
        let payload = Login {
            username: username.to_string(),
            password: password.to_string(),
        };
        let res = self
            .http
            .post(self.endpoint("api/login")?)
            .json(&payload)
            .send()
            .await
            .map_err(ClientError::Transport)?;
        let body: LoginResponse = read_json(res).await?;
        if !body.auth {
            return Err(ClientError::Unauthorized);
        }
        tracing::info!(username, "logged in");
        Ok(())
    }

    pub async fn account(&mut self, id: i64) -> ClientResult<AccountView> {
        self.fetch(
            QueryKey::one(Collection::Accounts, id),
            &format!("api/accounts/{id}"),
        )
        .await
    }

    pub async fn transaction(&mut self, id: i64) -> ClientResult<TransactionDetail> {
        self.fetch(
            QueryKey::one(Collection::Transactions, id),
            &format!("api/transactions/{id}"),
        )
        .await
    }

    pub async fn currencies(&mut self) -> ClientResult<Vec<CurrencyView>> {
        self.fetch(QueryKey::all(Collection::Currencies), "api/currencies")
            .await
    }

    pub async fn add_transaction(&mut self, payload: &TransactionRequest) -> ClientResult<()> {
        let res = self
            .http
            .post(self.endpoint("api/transactions/add")?)
            .json(payload)
            .send()
            .await
            .map_err(ClientError::Transport)?;
        self.finish_mutation(res).await
    }

    pub async fn edit_transaction(
        &mut self,
        id: i64,
        payload: &TransactionRequest,
    ) -> ClientResult<()> {
        let res = self
            .http
            .put(self.endpoint(&format!("api/transactions/{id}/edit"))?)
            .json(payload)
            .send()
            .await
            .map_err(ClientError::Transport)?;
        self.finish_mutation(res).await
    }

    async fn fetch<T: DeserializeOwned>(&mut self, key: QueryKey, path: &str) -> ClientResult<T> {
        if let Some(value) = self.cache.get(key) {
            tracing::debug!(?key, "cache hit");
            return decode(value.clone());
        }

        let res = self
            .http
            .get(self.endpoint(path)?)
            .send()
            .await
            .map_err(ClientError::Transport)?;
        let value: serde_json::Value = read_json(res).await?;
        let parsed = decode(value.clone())?;
        self.cache.insert(key, value);
        Ok(parsed)
    }

    async fn finish_mutation(&mut self, res: Response) -> ClientResult<()> {
        let body: Success = read_json(res).await?;
        if !body.success {
            return Err(ClientError::Server("transaction was not saved".to_string()));
        }
        self.cache.invalidate_after_mutation();
        Ok(())
    }
}

fn decode<T: DeserializeOwned>(value: serde_json::Value) -> ClientResult<T> {
    serde_json::from_value(value)
        .map_err(|err| ClientError::Server(format!("unexpected response: {err}")))
}

async fn read_json<T: DeserializeOwned>(res: Response) -> ClientResult<T> {
    let status = res.status();
    if status.is_success() {
        return res.json::<T>().await.map_err(ClientError::Transport);
    }

    let body = res
        .json::<ErrorMessage>()
        .await
        .map(|err| err.msg)
        .unwrap_or_else(|_| "unknown error".to_string());
    tracing::warn!(status = status.as_u16(), %body, "request failed");

    Err(status_error(status.as_u16(), body))
}

fn status_error(status: u16, body: String) -> ClientError {
    match status {
        401 | 403 => ClientError::Unauthorized,
        404 => ClientError::NotFound,
        400 | 409 | 422 => ClientError::BadRequest(body),
        _ => ClientError::Server(body),
    }
}
