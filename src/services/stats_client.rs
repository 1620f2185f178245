use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{Duration, Local, NaiveDateTime};
use tracing::{debug, warn};

use crate::models::stats::{EndpointHit, ViewStats};
use crate::utils::DATE_FORMAT;

/// Capability interface for the stats collector. Both operations are
/// best-effort: failures are logged and degrade to a no-op or empty result,
/// never to a user-visible error.
#[async_trait]
pub trait ViewTracker: Send + Sync {
    async fn record_hit(&self, uri: &str, ip: &str);

    /// Unique-IP view counts per uri within `[start, end]`. Any failure
    /// yields an empty map.
    async fn view_counts(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
        uris: &[String],
    ) -> HashMap<String, i64>;
}

/// HTTP client for the stats collector service.
#[derive(Clone)]
pub struct StatsClient {
    http: reqwest::Client,
    base_url: String,
    app_name: String,
}

impl StatsClient {
    pub fn new(base_url: &str, app_name: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            app_name: app_name.to_string(),
        }
    }
}

#[async_trait]
impl ViewTracker for StatsClient {
    async fn record_hit(&self, uri: &str, ip: &str) {
        let hit = EndpointHit {
            app: self.app_name.clone(),
            uri: uri.to_string(),
            ip: ip.to_string(),
            timestamp: Local::now().naive_local(),
        };

        let url = format!("{}/hit", self.base_url);
        match self.http.post(&url).json(&hit).send().await {
            Ok(response) if response.status().is_success() => {
                debug!("Saved hit for uri: {}, ip: {}", uri, ip);
            }
            Ok(response) => {
                warn!("Failed to save hit to stats service: {}", response.status());
            }
            Err(e) => {
                warn!("Failed to save hit to stats service: {}", e);
            }
        }
    }

    async fn view_counts(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
        uris: &[String],
    ) -> HashMap<String, i64> {
        let mut url = format!(
            "{}/stats?start={}&end={}&unique=true",
            self.base_url,
            urlencoding::encode(&start.format(DATE_FORMAT).to_string()),
            urlencoding::encode(&end.format(DATE_FORMAT).to_string()),
        );
        if !uris.is_empty() {
            url.push_str("&uris=");
            url.push_str(&urlencoding::encode(&uris.join(",")));
        }

        let stats: Vec<ViewStats> = match self.http.get(&url).send().await {
            Ok(response) if response.status().is_success() => {
                match response.json().await {
                    Ok(stats) => stats,
                    Err(e) => {
                        warn!("Failed to decode stats response: {}", e);
                        return HashMap::new();
                    }
                }
            }
            Ok(response) => {
                warn!("Failed to get stats from stats service: {}", response.status());
                return HashMap::new();
            }
            Err(e) => {
                warn!("Failed to get stats from stats service: {}", e);
                return HashMap::new();
            }
        };

        debug!("Retrieved {} stats records for {} uris", stats.len(), uris.len());
        stats.into_iter().map(|s| (s.uri, s.hits)).collect()
    }
}

/// No-op tracker for tests and degraded setups.
pub struct NoopViewTracker;

#[async_trait]
impl ViewTracker for NoopViewTracker {
    async fn record_hit(&self, _uri: &str, _ip: &str) {}

    async fn view_counts(
        &self,
        _start: NaiveDateTime,
        _end: NaiveDateTime,
        _uris: &[String],
    ) -> HashMap<String, i64> {
        HashMap::new()
    }
}

/// Fetches unique-IP view counts for a set of events, keyed by event id.
/// The window opens at the earliest `published_on` (or one year back for
/// unpublished events) and closes now. Missing entries mean zero views.
pub async fn event_views(
    tracker: &dyn ViewTracker,
    events: &[(i64, Option<NaiveDateTime>)],
) -> HashMap<i64, i64> {
    if events.is_empty() {
        return HashMap::new();
    }

    let now = Local::now().naive_local();
    let fallback = now - Duration::days(365);
    let start = events
        .iter()
        .map(|(_, published_on)| published_on.unwrap_or(fallback))
        .min()
        .unwrap_or(fallback);

    let uris: Vec<String> = events.iter().map(|(id, _)| format!("/events/{}", id)).collect();
    let counts = tracker.view_counts(start, now, &uris).await;

    events
        .iter()
        .map(|(id, _)| (*id, counts.get(&format!("/events/{}", id)).copied().unwrap_or(0)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn event_views_defaults_to_zero_without_stats() {
        let views = event_views(&NoopViewTracker, &[(1, None), (2, None)]).await;
        assert_eq!(views.get(&1), Some(&0));
        assert_eq!(views.get(&2), Some(&0));
    }

    #[tokio::test]
    async fn event_views_empty_input_skips_call() {
        let views = event_views(&NoopViewTracker, &[]).await;
        assert!(views.is_empty());
    }
}
