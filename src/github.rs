use crate::config::RepoId;
use crate::error::FetchError;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use octocrab::{Octocrab, Page};
use serde::Serialize;
use serde_json::Value;

/// Yields raw records one API page at a time.
#[async_trait]
pub trait RecordPager: Send {
    /// Returns the next page, or `None` once the listing is exhausted.
    async fn next_page(&mut self) -> Result<Option<Vec<Value>>, FetchError>;
}

/// The listings the fetchers read from.
pub trait IssueTracker: Send + Sync {
    /// Issues (and issue-shaped pull requests) updated at or after `since`,
    /// in the tracker's default order.
    fn issues(&self, since: DateTime<Utc>, per_page: u8) -> Box<dyn RecordPager + '_>;

    /// All pull requests, newest first.
    fn pull_requests(&self, per_page: u8) -> Box<dyn RecordPager + '_>;
}

pub struct GitHubClient {
    octocrab: Octocrab,
}

impl GitHubClient {
    pub fn new(token: String) -> Result<Self, FetchError> {
        let octocrab = Octocrab::builder()
            .personal_token(token)
            .build()
            .map_err(|e| FetchError::network("building the GitHub client", e))?;

        Ok(Self { octocrab })
    }

    /// Same as [`GitHubClient::new`] but against another API root, such as a
    /// GitHub Enterprise host.
    pub fn with_base_uri(token: String, base_uri: &str) -> Result<Self, FetchError> {
        let octocrab = Octocrab::builder()
            .base_uri(base_uri)
            .map_err(|e| FetchError::Config(format!("invalid API base URI {base_uri:?}: {e}")))?
            .personal_token(token)
            .build()
            .map_err(|e| FetchError::network("building the GitHub client", e))?;

        Ok(Self { octocrab })
    }

    /// Resolves `repo_id`, which also proves the credential works.
    pub async fn repository(&self, repo_id: &RepoId) -> Result<Repository, FetchError> {
        let route = format!("/repos/{}/{}", repo_id.owner, repo_id.repo);
        let raw: Value = self
            .octocrab
            .get(route, None::<&()>)
            .await
            .map_err(|e| classify_resolve_error(repo_id, e))?;

        let full_name = raw
            .get("full_name")
            .and_then(Value::as_str)
            .unwrap_or_default();
        tracing::debug!(repo_id = %repo_id, full_name, "Resolved repository");

        Ok(Repository {
            octocrab: self.octocrab.clone(),
            id: repo_id.clone(),
            raw,
        })
    }
}

fn classify_resolve_error(repo_id: &RepoId, err: octocrab::Error) -> FetchError {
    if let octocrab::Error::GitHub { source, .. } = &err {
        match source.status_code.as_u16() {
            401 => return FetchError::Authentication(source.message.clone()),
            404 => return FetchError::NotFound(repo_id.to_string()),
            _ => {}
        }
    }
    FetchError::network("resolving the repository", err)
}

/// A resolved repository, shared read-only by both fetches.
pub struct Repository {
    octocrab: Octocrab,
    id: RepoId,
    raw: Value,
}

impl Repository {
    pub fn id(&self) -> &RepoId {
        &self.id
    }

    /// The repository object exactly as the API returned it.
    pub fn raw(&self) -> &Value {
        &self.raw
    }
}

impl IssueTracker for Repository {
    fn issues(&self, since: DateTime<Utc>, per_page: u8) -> Box<dyn RecordPager + '_> {
        Box::new(OctocrabPager::new(
            &self.octocrab,
            format!("/repos/{}/{}/issues", self.id.owner, self.id.repo),
            ListParams {
                state: "all",
                since: Some(since.to_rfc3339_opts(SecondsFormat::Secs, true)),
                sort: None,
                direction: None,
                per_page,
            },
        ))
    }

    fn pull_requests(&self, per_page: u8) -> Box<dyn RecordPager + '_> {
        Box::new(OctocrabPager::new(
            &self.octocrab,
            format!("/repos/{}/{}/pulls", self.id.owner, self.id.repo),
            ListParams {
                state: "all",
                since: None,
                sort: Some("created"),
                direction: Some("desc"),
                per_page,
            },
        ))
    }
}

#[derive(Serialize)]
struct ListParams {
    state: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    since: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sort: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    direction: Option<&'static str>,
    per_page: u8,
}

/// Follows the `Link: rel="next"` chain of one listing.
struct OctocrabPager<'a> {
    octocrab: &'a Octocrab,
    route: String,
    params: ListParams,
    /// The previous page with its items already handed out; `None` until the
    /// first request.
    last: Option<Page<Value>>,
}

impl<'a> OctocrabPager<'a> {
    fn new(octocrab: &'a Octocrab, route: String, params: ListParams) -> Self {
        Self {
            octocrab,
            route,
            params,
            last: None,
        }
    }
}

#[async_trait]
impl RecordPager for OctocrabPager<'_> {
    async fn next_page(&mut self) -> Result<Option<Vec<Value>>, FetchError> {
        let page: Option<Page<Value>> = match &self.last {
            None => Some(
                self.octocrab
                    .get(&self.route, Some(&self.params))
                    .await
                    .map_err(|e| FetchError::network("listing records", e))?,
            ),
            Some(last) if last.next.is_none() => None,
            Some(last) => self
                .octocrab
                .get_page(&last.next)
                .await
                .map_err(|e| FetchError::network("listing records", e))?,
        };

        Ok(page.map(|mut page| {
            let items = std::mem::take(&mut page.items);
            self.last = Some(page);
            items
        }))
    }
}
