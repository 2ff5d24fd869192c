use bb_core::config::GithubConfig;
use bb_core::error::ServiceError;
use bb_core::sync::{PAGE_SIZE, PullRequestSource};
use bb_core::types::{PullRequestPage, Repo};
use reqwest::Client as HttpClient;
use reqwest::header::{ACCEPT, AUTHORIZATION, LINK};
use tracing::debug;
use url::Url;

use crate::link::next_page;
use crate::pulls::decode_pulls;

/// GitHub REST client for the pull request listing.
#[derive(Debug, Clone)]
pub struct GithubClient {
    http_client: HttpClient,
    api_url: Url,
    token: Option<String>,
}

impl GithubClient {
    pub fn new(api_url: &str, token: Option<String>) -> Result<Self, ServiceError> {
        // Joining onto a base without a trailing slash would drop its last
        // path segment.
        let api_url = if api_url.ends_with('/') {
            Url::parse(api_url)
        } else {
            Url::parse(&format!("{api_url}/"))
        }
        .map_err(|err| ServiceError::Request {
            message: format!("invalid api url {api_url}: {err}"),
        })?;
        let http_client = HttpClient::builder()
            .user_agent(concat!("backboard/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| ServiceError::Request {
                message: err.to_string(),
            })?;
        Ok(Self {
            http_client,
            api_url,
            token,
        })
    }

    /// Builds a client from config, reading the token from the configured
    /// environment variable. A missing token means anonymous requests.
    pub fn from_config(config: &GithubConfig) -> Result<Self, ServiceError> {
        let token = std::env::var(&config.token_env).ok();
        if token.is_none() {
            debug!(env = %config.token_env, "no github token set");
        }
        Self::new(&config.api_url, token)
    }

    fn pulls_url(&self, repo: &Repo, page: u32) -> Result<Url, ServiceError> {
        let mut url = self
            .api_url
            .join(&format!("repos/{}/{}/pulls", repo.owner, repo.name))
            .map_err(|err| ServiceError::Request {
                message: err.to_string(),
            })?;
        url.query_pairs_mut()
            .append_pair("state", "all")
            .append_pair("sort", "updated")
            .append_pair("direction", "desc")
            .append_pair("per_page", &PAGE_SIZE.to_string())
            .append_pair("page", &page.to_string());
        Ok(url)
    }
}

impl PullRequestSource for GithubClient {
    async fn list_pull_requests(
        &self,
        repo: &Repo,
        page: u32,
    ) -> Result<PullRequestPage, ServiceError> {
        let url = self.pulls_url(repo, page)?;
        let mut request = self
            .http_client
            .get(url)
            .header(ACCEPT, "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        let response = request.send().await.map_err(|err| ServiceError::Request {
            message: err.to_string(),
        })?;

        let status = response.status();
        let next = response
            .headers()
            .get(LINK)
            .and_then(|value| value.to_str().ok())
            .and_then(next_page);
        let text = response.text().await.map_err(|err| ServiceError::Request {
            message: err.to_string(),
        })?;
        if !status.is_success() {
            return Err(ServiceError::Status {
                status: status.as_u16(),
                message: text,
            });
        }

        let items = decode_pulls(&text)?;
        debug!(%repo, page, count = items.len(), next = ?next, "listed pull requests");
        Ok(PullRequestPage {
            items,
            next_page: next,
        })
    }
}
