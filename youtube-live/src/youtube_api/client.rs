//! Authenticated access to the YouTube Live Streaming API.

use crate::error::YtError;
use crate::token::TokenProvider;
use crate::youtube_api::broadcasts::{
    BroadcastFilter, BroadcastStatus, LiveBroadcast, LiveBroadcastInsert, LiveBroadcastUpdate,
};
use crate::youtube_api::normalize;
use crate::youtube_api::status::StatusSnapshot;
use crate::youtube_api::streams::{LiveStream, LiveStreamInsert, LiveStreamUpdate};
use crate::youtube_api::types::ListResponse;
use bytes::Bytes;
use http::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio_stream::Stream;
use tracing::instrument;

/// Parts requested for every broadcast call.
const BROADCAST_PARTS: &str = "id,snippet,contentDetails,status";

/// Parts requested for every stream call.
const STREAM_PARTS: &str = "id,snippet,cdn,status";

/// Where and how the client talks to the API.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Root of the Data API, without a trailing slash.
    pub base_url: String,
    /// Developer API key, attached as the `key` query parameter when set.
    pub api_key: Option<String>,
    /// `maxResults` for list calls (1-50).
    pub max_results: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.googleapis.com/youtube/v3".to_string(),
            api_key: None,
            max_results: 50,
        }
    }
}

/// Client for the YouTube Data API v3 live streaming endpoints.
///
/// Each method performs exactly one HTTP round trip (the paginated streams and
/// [`Self::broadcast_status`] excepted) and never retries. Tokens are fetched from the
/// [`TokenProvider`] before every request.
///
/// **Broadcasts vs Streams**: a broadcast is the viewer-facing event (title, schedule,
/// privacy, lifecycle status); a stream is the ingestion endpoint the encoder pushes video
/// to. A broadcast must be bound to a stream before it can go live.
#[derive(Debug)]
pub struct YouTubeClient<P> {
    tokens: Arc<P>,
    config: Arc<ClientConfig>,
    client: reqwest::Client,
}

impl<P> Clone for YouTubeClient<P> {
    fn clone(&self) -> Self {
        Self {
            tokens: Arc::clone(&self.tokens),
            config: Arc::clone(&self.config),
            client: self.client.clone(),
        }
    }
}

impl<P: TokenProvider> YouTubeClient<P> {
    pub fn new(tokens: P, config: ClientConfig, client: reqwest::Client) -> Self {
        Self {
            tokens: Arc::new(tokens),
            config: Arc::new(config),
            client,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn token_provider(&self) -> &P {
        &self.tokens
    }

    async fn bearer_token(&self) -> Result<String, YtError> {
        match self.tokens.access_token().await {
            Ok(Some(token)) => Ok(token),
            Ok(None) => Err(YtError::message("OAuth token is not presented")),
            Err(e) => Err(YtError::message(format!(
                "Failed to obtain OAuth token: {e:#}"
            ))),
        }
    }

    /// Sends one authenticated request and returns the raw status and body.
    ///
    /// Transport failures come back as [`YtError::System`]; the caller is responsible for
    /// passing the status and body through [`normalize`].
    #[instrument(skip(self, query, body), level = "trace")]
    async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&(impl Serialize + Sync)>,
    ) -> Result<(StatusCode, Bytes), YtError> {
        let token = self.bearer_token().await?;
        let url = format!("{}/{}", self.config.base_url.trim_end_matches('/'), path);

        let mut request = self
            .client
            .request(method, &url)
            .bearer_auth(token)
            .header(http::header::ACCEPT, "application/json")
            .query(query);

        if let Some(key) = &self.config.api_key {
            request = request.query(&[("key", key.as_str())]);
        }

        // reqwest sets the JSON content type
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| YtError::System {
            code: status.as_u16(),
            message: e.to_string(),
        })?;
        tracing::trace!(%status, len = bytes.len(), "received YouTube API response");
        Ok((status, bytes))
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&(impl Serialize + Sync)>,
    ) -> Result<T, YtError> {
        let (status, bytes) = self.send(method, path, query, body).await?;
        normalize::decode(status, &bytes)
    }

    async fn call_without_content(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<(), YtError> {
        let (status, bytes) = self.send(method, path, query, None::<&()>).await?;
        normalize::check(status, &bytes)
    }

    /// Fetches one page of broadcasts matching `filter`.
    ///
    /// # API Reference
    ///
    /// <https://developers.google.com/youtube/v3/live/docs/liveBroadcasts/list>
    #[instrument(skip(self))]
    pub async fn list_live_broadcasts(
        &self,
        filter: BroadcastFilter,
        page_token: Option<&str>,
    ) -> Result<ListResponse<LiveBroadcast>, YtError> {
        let max_results = self.config.max_results.to_string();
        let mut query = vec![
            ("part", BROADCAST_PARTS),
            ("broadcastStatus", filter.as_str()),
            ("maxResults", max_results.as_str()),
        ];
        if let Some(token) = page_token {
            query.push(("pageToken", token));
        }

        let page: ListResponse<LiveBroadcast> = self
            .call(Method::GET, "liveBroadcasts", &query, None::<&()>)
            .await?;

        tracing::debug!(
            total_results = page.page_info.total_results,
            returned_items = page.items.len(),
            "fetched live broadcasts"
        );
        if page.page_info.has_more_pages() && page.next_page_token.is_some() {
            tracing::debug!("more broadcasts available on the next page");
        }

        Ok(page)
    }

    /// All broadcasts matching `filter`, following `nextPageToken` until exhausted.
    pub fn live_broadcasts(
        &self,
        filter: BroadcastFilter,
    ) -> impl Stream<Item = Result<LiveBroadcast, YtError>> + use<'_, P> {
        async_stream::try_stream! {
            let mut page_token: Option<String> = None;
            loop {
                let page = self.list_live_broadcasts(filter, page_token.as_deref()).await?;
                for broadcast in page.items {
                    yield broadcast;
                }
                match page.next_page_token {
                    Some(next) => page_token = Some(next),
                    None => break,
                }
            }
        }
    }

    /// Fetches a single broadcast by ID.
    ///
    /// Fails with `"broadcast does not exist"` if YouTube returns no matching item.
    #[instrument(skip(self))]
    pub async fn get_live_broadcast(&self, broadcast_id: &str) -> Result<LiveBroadcast, YtError> {
        let query = [("part", BROADCAST_PARTS), ("id", broadcast_id)];
        let page: ListResponse<LiveBroadcast> = self
            .call(Method::GET, "liveBroadcasts", &query, None::<&()>)
            .await?;

        page.items
            .into_iter()
            .find(|broadcast| broadcast.id == broadcast_id)
            .ok_or_else(|| YtError::message("broadcast does not exist"))
    }

    /// Creates a broadcast.
    ///
    /// # API Reference
    ///
    /// <https://developers.google.com/youtube/v3/live/docs/liveBroadcasts/insert>
    #[instrument(skip(self, insert), fields(title = insert.title()))]
    pub async fn insert_live_broadcast(
        &self,
        insert: &LiveBroadcastInsert,
    ) -> Result<LiveBroadcast, YtError> {
        let query = [("part", BROADCAST_PARTS)];
        let broadcast: LiveBroadcast = self
            .call(Method::POST, "liveBroadcasts", &query, Some(insert))
            .await?;
        tracing::debug!(broadcast_id = %broadcast.id, "created broadcast");
        Ok(broadcast)
    }

    /// Replaces the mutable fields of a broadcast.
    ///
    /// # API Reference
    ///
    /// <https://developers.google.com/youtube/v3/live/docs/liveBroadcasts/update>
    #[instrument(skip(self, update), fields(broadcast_id = update.id()))]
    pub async fn update_live_broadcast(
        &self,
        update: &LiveBroadcastUpdate,
    ) -> Result<LiveBroadcast, YtError> {
        let query = [("part", BROADCAST_PARTS)];
        let broadcast: LiveBroadcast = self
            .call(Method::PUT, "liveBroadcasts", &query, Some(update))
            .await?;
        tracing::debug!(broadcast_id = %broadcast.id, "updated broadcast");
        Ok(broadcast)
    }

    /// Deletes a broadcast.
    #[instrument(skip(self))]
    pub async fn delete_live_broadcast(&self, broadcast_id: &str) -> Result<(), YtError> {
        self.call_without_content(Method::DELETE, "liveBroadcasts", &[("id", broadcast_id)])
            .await?;
        tracing::debug!(broadcast_id, "deleted broadcast");
        Ok(())
    }

    /// Binds `stream_id` to the broadcast, replacing any existing binding.
    ///
    /// A broadcast can only be bound to one stream, though a stream may be bound to more
    /// than one broadcast.
    ///
    /// # API Reference
    ///
    /// <https://developers.google.com/youtube/v3/live/docs/liveBroadcasts/bind>
    #[instrument(skip(self))]
    pub async fn bind_live_broadcast(
        &self,
        broadcast_id: &str,
        stream_id: &str,
    ) -> Result<LiveBroadcast, YtError> {
        let query = [
            ("part", BROADCAST_PARTS),
            ("id", broadcast_id),
            ("streamId", stream_id),
        ];
        let broadcast: LiveBroadcast = self
            .call(Method::POST, "liveBroadcasts/bind", &query, None::<&()>)
            .await?;
        tracing::debug!(broadcast_id, stream_id, "bound broadcast to stream");
        Ok(broadcast)
    }

    /// Moves a broadcast to `status` and starts whatever YouTube associates with it.
    ///
    /// Before moving to `testing` or `live`, the bound stream's `status.streamStatus`
    /// should be `active`. The change is not rolled back on failure.
    ///
    /// # API Reference
    ///
    /// <https://developers.google.com/youtube/v3/live/docs/liveBroadcasts/transition>
    #[instrument(skip(self))]
    pub async fn transition_live_broadcast(
        &self,
        broadcast_id: &str,
        status: BroadcastStatus,
    ) -> Result<LiveBroadcast, YtError> {
        let query = [
            ("part", BROADCAST_PARTS),
            ("id", broadcast_id),
            ("broadcastStatus", status.as_str()),
        ];
        let broadcast: LiveBroadcast = self
            .call(Method::POST, "liveBroadcasts/transition", &query, None::<&()>)
            .await?;
        tracing::debug!(
            broadcast_id = %broadcast.id,
            lifecycle = %broadcast.status.life_cycle_status,
            "transitioned broadcast"
        );
        Ok(broadcast)
    }

    /// Fetches one page of the authenticated user's streams.
    ///
    /// # API Reference
    ///
    /// <https://developers.google.com/youtube/v3/live/docs/liveStreams/list>
    #[instrument(skip(self))]
    pub async fn list_live_streams(
        &self,
        page_token: Option<&str>,
    ) -> Result<ListResponse<LiveStream>, YtError> {
        let max_results = self.config.max_results.to_string();
        let mut query = vec![
            ("part", STREAM_PARTS),
            ("mine", "true"),
            ("maxResults", max_results.as_str()),
        ];
        if let Some(token) = page_token {
            query.push(("pageToken", token));
        }

        let page: ListResponse<LiveStream> = self
            .call(Method::GET, "liveStreams", &query, None::<&()>)
            .await?;

        tracing::debug!(
            total_results = page.page_info.total_results,
            returned_items = page.items.len(),
            "fetched live streams"
        );
        Ok(page)
    }

    /// All of the authenticated user's streams, across pages.
    pub fn live_streams(&self) -> impl Stream<Item = Result<LiveStream, YtError>> + use<'_, P> {
        async_stream::try_stream! {
            let mut page_token: Option<String> = None;
            loop {
                let page = self.list_live_streams(page_token.as_deref()).await?;
                for stream in page.items {
                    yield stream;
                }
                match page.next_page_token {
                    Some(next) => page_token = Some(next),
                    None => break,
                }
            }
        }
    }

    /// Fetches a single stream by ID.
    ///
    /// Fails with `"Live stream not found"` if YouTube returns no matching item.
    #[instrument(skip(self))]
    pub async fn get_live_stream(&self, stream_id: &str) -> Result<LiveStream, YtError> {
        let query = [("part", STREAM_PARTS), ("id", stream_id)];
        let page: ListResponse<LiveStream> = self
            .call(Method::GET, "liveStreams", &query, None::<&()>)
            .await?;

        page.items
            .into_iter()
            .find(|stream| stream.id == stream_id)
            .ok_or_else(|| YtError::message("Live stream not found"))
    }

    /// Creates a stream.
    ///
    /// # API Reference
    ///
    /// <https://developers.google.com/youtube/v3/live/docs/liveStreams/insert>
    #[instrument(skip(self, insert))]
    pub async fn insert_live_stream(&self, insert: &LiveStreamInsert) -> Result<LiveStream, YtError> {
        let query = [("part", STREAM_PARTS)];
        let stream: LiveStream = self
            .call(Method::POST, "liveStreams", &query, Some(insert))
            .await?;
        tracing::debug!(stream_id = %stream.id, "created stream");
        Ok(stream)
    }

    /// Changes a stream's title or ingestion settings.
    #[instrument(skip(self, update), fields(stream_id = update.id()))]
    pub async fn update_live_stream(&self, update: &LiveStreamUpdate) -> Result<LiveStream, YtError> {
        let query = [("part", STREAM_PARTS)];
        let stream: LiveStream = self
            .call(Method::PUT, "liveStreams", &query, Some(update))
            .await?;
        tracing::debug!(stream_id = %stream.id, "updated stream");
        Ok(stream)
    }

    /// Deletes a stream.
    #[instrument(skip(self))]
    pub async fn delete_live_stream(&self, stream_id: &str) -> Result<(), YtError> {
        self.call_without_content(Method::DELETE, "liveStreams", &[("id", stream_id)])
            .await?;
        tracing::debug!(stream_id, "deleted stream");
        Ok(())
    }

    /// Reads the current broadcast lifecycle status and the bound stream's status and health.
    ///
    /// The broadcast is read first, then the stream; the first failure is returned as-is.
    #[instrument(skip_all, fields(broadcast_id = %broadcast.id, stream_id = %stream.id))]
    pub async fn broadcast_status(
        &self,
        broadcast: &LiveBroadcast,
        stream: &LiveStream,
    ) -> Result<StatusSnapshot, YtError> {
        let broadcast = self.get_live_broadcast(&broadcast.id).await?;
        let stream = self.get_live_stream(&stream.id).await?;
        let snapshot = StatusSnapshot::from_resources(&broadcast, &stream).ok_or_else(|| {
            YtError::message("Parsing data error: live stream response has no status")
        })?;
        tracing::trace!(%snapshot, "read broadcast status");
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::StaticToken;
    use crate::youtube_api::broadcasts::BroadcastLifeCycleStatus;
    use crate::youtube_api::streams::{HealthStatus, StreamStatus};
    use crate::youtube_api::test_server::TestServer;
    use insta::assert_snapshot;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tokio_stream::StreamExt;

    fn client_for(server: &TestServer) -> YouTubeClient<StaticToken> {
        client_with_token(server, StaticToken::new("ya29.test"))
    }

    fn client_with_token(server: &TestServer, token: StaticToken) -> YouTubeClient<StaticToken> {
        YouTubeClient::new(
            token,
            ClientConfig {
                base_url: server.url(),
                api_key: Some("dev-key".to_string()),
                max_results: 5,
            },
            reqwest::Client::new(),
        )
    }

    fn broadcast_json(id: &str, lifecycle: &str) -> serde_json::Value {
        json!({
            "id": id,
            "snippet": { "title": format!("broadcast {id}"), "publishedAt": "2024-03-01T10:00:00Z" },
            "status": { "lifeCycleStatus": lifecycle, "privacyStatus": "private" }
        })
    }

    fn list_json(items: Vec<serde_json::Value>, next: Option<&str>) -> String {
        let mut list = json!({
            "kind": "youtube#liveBroadcastListResponse",
            "pageInfo": { "totalResults": 3, "resultsPerPage": 2 },
            "items": items,
        });
        if let Some(next) = next {
            list["nextPageToken"] = json!(next);
        }
        list.to_string()
    }

    #[tokio::test]
    async fn get_broadcast_sends_auth_and_parts() {
        let server = TestServer::start(vec![(
            StatusCode::OK,
            list_json(vec![broadcast_json("bc-1", "ready")], None),
        )])
        .await;
        let yt = client_for(&server);

        let broadcast = yt.get_live_broadcast("bc-1").await.unwrap();
        assert_eq!(broadcast.status.life_cycle_status, BroadcastLifeCycleStatus::Ready);

        let requests = server.requests();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.method, Method::GET);
        assert_eq!(request.path, "/liveBroadcasts");
        assert_eq!(request.header("authorization"), Some("Bearer ya29.test"));
        assert_eq!(request.header("accept"), Some("application/json"));
        assert_eq!(request.query("part"), Some(BROADCAST_PARTS));
        assert_eq!(request.query("id"), Some("bc-1"));
        assert_eq!(request.query("key"), Some("dev-key"));
    }

    #[tokio::test]
    async fn missing_broadcast_is_reported() {
        let server = TestServer::start(vec![(StatusCode::OK, list_json(vec![], None))]).await;
        let err = client_for(&server).get_live_broadcast("gone").await.unwrap_err();
        assert_snapshot!(err, @"broadcast does not exist");
    }

    #[tokio::test]
    async fn missing_stream_is_reported() {
        let server = TestServer::start(vec![(StatusCode::OK, list_json(vec![], None))]).await;
        let err = client_for(&server).get_live_stream("gone").await.unwrap_err();
        assert_snapshot!(err, @"Live stream not found");
    }

    #[tokio::test]
    async fn absent_token_never_reaches_the_network() {
        let server = TestServer::start(vec![]).await;
        let yt = client_with_token(&server, StaticToken(None));

        let err = yt.delete_live_broadcast("bc-1").await.unwrap_err();
        assert_snapshot!(err, @"OAuth token is not presented");
        assert!(server.requests().is_empty());
    }

    #[tokio::test]
    async fn transport_failure_is_system_error() {
        let yt = YouTubeClient::new(
            StaticToken::new("ya29.test"),
            ClientConfig {
                base_url: TestServer::unreachable_url().await,
                ..ClientConfig::default()
            },
            reqwest::Client::new(),
        );

        let err = yt.get_live_stream("st-1").await.unwrap_err();
        assert!(matches!(err, YtError::System { code: 0, .. }), "{err:?}");
    }

    #[tokio::test]
    async fn embedded_error_is_api_error() {
        let server = TestServer::start(vec![(
            StatusCode::OK,
            r#"{"error":{"message":"X"}}"#.to_string(),
        )])
        .await;

        let err = client_for(&server)
            .bind_live_broadcast("bc-1", "st-1")
            .await
            .unwrap_err();
        assert!(matches!(&err, YtError::Api { message, .. } if message.contains('X')), "{err:?}");

        let request = &server.requests()[0];
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.path, "/liveBroadcasts/bind");
        assert_eq!(request.query("streamId"), Some("st-1"));
    }

    #[tokio::test]
    async fn undecodable_body_is_parsing_error() {
        let server =
            TestServer::start(vec![(StatusCode::OK, r#"{"id": 12}"#.to_string())]).await;
        let err = client_for(&server)
            .transition_live_broadcast("bc-1", BroadcastStatus::Testing)
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("Parsing data error"), "{err}");
        assert_eq!(server.requests()[0].query("broadcastStatus"), Some("testing"));
    }

    #[tokio::test]
    async fn delete_accepts_no_content() {
        let server = TestServer::start(vec![(StatusCode::NO_CONTENT, String::new())]).await;
        client_for(&server).delete_live_stream("st-1").await.unwrap();

        let request = &server.requests()[0];
        assert_eq!(request.method, Method::DELETE);
        assert_eq!(request.path, "/liveStreams");
        assert_eq!(request.query("id"), Some("st-1"));
    }

    #[tokio::test]
    async fn insert_posts_json_body() {
        let server = TestServer::start(vec![(
            StatusCode::OK,
            broadcast_json("bc-9", "created").to_string(),
        )])
        .await;
        let start = "2024-03-09T18:00:00Z".parse().unwrap();
        let insert = LiveBroadcastInsert::new_in("Launch", "", start, jiff::tz::TimeZone::UTC);

        let broadcast = client_for(&server).insert_live_broadcast(&insert).await.unwrap();
        assert_eq!(broadcast.id, "bc-9");

        let request = &server.requests()[0];
        assert_eq!(request.header("content-type"), Some("application/json"));
        assert_eq!(
            request.json_body(),
            json!({
                "snippet": {
                    "title": "Launch",
                    "description": "",
                    "scheduledStartTime": "2024-03-09T18:00:00+00:00"
                },
                "status": { "privacyStatus": "private" },
                "contentDetails": {}
            })
        );
    }

    #[tokio::test]
    async fn broadcast_stream_follows_page_tokens() {
        let server = TestServer::start(vec![
            (
                StatusCode::OK,
                list_json(
                    vec![broadcast_json("bc-1", "live"), broadcast_json("bc-2", "ready")],
                    Some("page-2"),
                ),
            ),
            (
                StatusCode::OK,
                list_json(vec![broadcast_json("bc-3", "complete")], None),
            ),
        ])
        .await;
        let yt = client_for(&server);

        let ids: Vec<String> = yt
            .live_broadcasts(BroadcastFilter::All)
            .map(|b| b.map(|b| b.id))
            .collect::<Result<_, _>>()
            .await
            .unwrap();
        assert_eq!(ids, ["bc-1", "bc-2", "bc-3"]);

        let requests = server.requests();
        assert_eq!(requests[0].query("pageToken"), None);
        assert_eq!(requests[1].query("pageToken"), Some("page-2"));
        assert_eq!(requests[1].query("maxResults"), Some("5"));
        assert_eq!(requests[1].query("broadcastStatus"), Some("all"));
    }

    #[tokio::test]
    async fn status_combines_broadcast_and_stream() {
        let stream = json!({
            "id": "st-1",
            "snippet": { "title": "encoder" },
            "status": { "streamStatus": "active", "healthStatus": { "status": "noData" } }
        });
        let server = TestServer::start(vec![
            (
                StatusCode::OK,
                list_json(vec![broadcast_json("bc-1", "testing")], None),
            ),
            (StatusCode::OK, json!({ "items": [stream.clone()] }).to_string()),
        ])
        .await;
        let yt = client_for(&server);

        let broadcast: LiveBroadcast =
            serde_json::from_value(broadcast_json("bc-1", "created")).unwrap();
        let stream: LiveStream = serde_json::from_value(stream).unwrap();

        let snapshot = yt.broadcast_status(&broadcast, &stream).await.unwrap();
        assert_eq!(
            snapshot,
            StatusSnapshot {
                broadcast_status: BroadcastLifeCycleStatus::Testing,
                stream_status: StreamStatus::Active,
                health_status: HealthStatus::NoData,
            }
        );

        let requests = server.requests();
        assert_eq!(requests[0].path, "/liveBroadcasts");
        assert_eq!(requests[1].path, "/liveStreams");
        assert_eq!(requests[1].query("part"), Some(STREAM_PARTS));
    }
}
