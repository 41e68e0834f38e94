//! Shared types for YouTube API list responses.

/// Paging details for lists of resources.
///
/// Includes the total number of items available and the number of resources
/// returned in a single page response.
///
/// See: <https://developers.google.com/youtube/v3/docs/pageInfo>
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// The total number of results in the result set.
    #[serde(default)]
    pub total_results: u32,
    /// The number of results included in the API response.
    #[serde(default)]
    pub results_per_page: u32,
}

impl PageInfo {
    /// Whether the result set spans more than one page.
    pub fn has_more_pages(&self) -> bool {
        self.total_results > self.results_per_page
    }
}

/// One page of a `*.list` response.
///
/// `liveBroadcasts.list` and `liveStreams.list` share this shape; only the item type differs.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse<T> {
    /// Identifies the API resource's type, e.g. `youtube#liveBroadcastListResponse`.
    #[serde(default)]
    pub kind: String,
    /// The items that match the request criteria.
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    #[serde(default)]
    pub page_info: PageInfo,
    /// Token for the `pageToken` parameter to retrieve the next page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
    /// Token for the `pageToken` parameter to retrieve the previous page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev_page_token: Option<String>,
}
