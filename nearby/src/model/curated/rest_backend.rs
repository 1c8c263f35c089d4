use std::{collections::HashSet, time::Duration};

use async_trait::async_trait;
use nearby_core::model::DiscoveryError;

use super::{
    realtime_channel::{realtime_url, SocketChannelHandle},
    ChannelHandle, CuratedBackend, CuratedPlaceRow, PlaceQuery, RealtimeSink,
};

pub const DEFAULT_TABLE: &str = "places";
pub const DEFAULT_PAGE_SIZE: usize = 1000;

/// a PostgREST endpoint (as hosted by Supabase) over the curated places table.
/// filters are pushed to the server and results are paged until a short page
/// or the requested limit. live changes come from the project's realtime
/// websocket, unless realtime is disabled for endpoints that do not serve it.
#[derive(Debug, Clone)]
pub struct RestCuratedBackend {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    table: String,
    page_size: usize,
    realtime: bool,
}

impl RestCuratedBackend {
    pub fn new(
        base_url: &str,
        api_key: &str,
        table: Option<String>,
        page_size: Option<usize>,
        timeout: Duration,
    ) -> Result<Self, DiscoveryError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                DiscoveryError::InvalidUserInput(format!("failure building HTTP client: {e}"))
            })?;
        let page_size = page_size.unwrap_or(DEFAULT_PAGE_SIZE);
        if page_size == 0 {
            return Err(DiscoveryError::InvalidUserInput(String::from(
                "curated page_size must be positive",
            )));
        }
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            table: table.unwrap_or_else(|| DEFAULT_TABLE.to_string()),
            page_size,
            realtime: true,
        })
    }

    pub fn with_realtime(mut self, enabled: bool) -> Self {
        self.realtime = enabled;
        self
    }

    fn url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.table)
    }

    async fn fetch_page(
        &self,
        params: &[(String, String)],
        limit: usize,
        offset: usize,
    ) -> Result<Vec<CuratedPlaceRow>, DiscoveryError> {
        let response = self
            .client
            .get(self.url())
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .query(params)
            .query(&[("limit", limit), ("offset", offset)])
            .send()
            .await
            .map_err(|e| {
                DiscoveryError::BackendFetchFailed(format!("request to {} failed: {e}", self.url()))
            })?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DiscoveryError::BackendFetchFailed(format!(
                "{} responded with status {status}: {}",
                self.url(),
                body.chars().take(200).collect::<String>()
            )));
        }
        response.json::<Vec<CuratedPlaceRow>>().await.map_err(|e| {
            DiscoveryError::BackendFetchFailed(format!("failure decoding places page: {e}"))
        })
    }
}

/// PostgREST query parameters for a curated read, excluding paging
pub fn query_params(query: &PlaceQuery) -> Vec<(String, String)> {
    let mut params = vec![(String::from("select"), String::from("*"))];
    let filter = &query.filter;
    if let Some(category) = filter.category {
        params.push((String::from("category"), format!("eq.{category}")));
    }
    if let Some(verified) = filter.verified {
        params.push((String::from("verified"), format!("is.{verified}")));
    }
    if let Some(min_rating) = filter.min_rating {
        params.push((String::from("rating"), format!("gte.{min_rating}")));
    }
    if let Some(term) = query.search_term() {
        let pattern = quote_value(&format!("*{term}*"));
        params.push((
            String::from("or"),
            format!("(name.ilike.{pattern},description.ilike.{pattern})"),
        ));
    }
    params.push((String::from("order"), String::from("rating.desc.nullslast,id.asc")));
    params
}

/// double-quote a PostgREST filter value so commas and parentheses are literal
fn quote_value(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}

#[async_trait]
impl CuratedBackend for RestCuratedBackend {
    async fn select_places(
        &self,
        query: &PlaceQuery,
    ) -> Result<Vec<CuratedPlaceRow>, DiscoveryError> {
        let params = query_params(query);
        let wanted = query.filter.limit;
        let mut rows: Vec<CuratedPlaceRow> = vec![];
        let mut seen = HashSet::new();
        let mut offset = 0;
        loop {
            let remaining = wanted.map(|w| w.saturating_sub(rows.len()));
            let page_limit = remaining.map_or(self.page_size, |r| r.min(self.page_size));
            if page_limit == 0 {
                break;
            }
            let page = self.fetch_page(&params, page_limit, offset).await?;
            let page_len = page.len();
            for row in page {
                if seen.insert(row.id.clone()) {
                    rows.push(row);
                }
            }
            log::debug!("fetched {page_len} curated rows at offset {offset}");
            if page_len < page_limit {
                break;
            }
            offset += page_len;
        }
        Ok(rows)
    }

    fn open_channel(&self, sink: RealtimeSink) -> Result<Box<dyn ChannelHandle>, DiscoveryError> {
        if !self.realtime {
            return Err(DiscoveryError::BackendSubscriptionFailed(format!(
                "realtime is disabled for {}",
                self.url()
            )));
        }
        let url = realtime_url(&self.base_url, &self.api_key)
            .map_err(|e| DiscoveryError::BackendSubscriptionFailed(e.to_string()))?;
        log::debug!(
            "opening realtime channel on {} for table {}",
            url.host_str().unwrap_or_default(),
            self.table
        );
        let handle =
            SocketChannelHandle::open(url, self.api_key.clone(), self.table.clone(), sink)?;
        Ok(Box::new(handle))
    }
}
