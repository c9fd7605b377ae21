//! One render: gather every data source, degrade what is missing, draw.

use std::io::Read;

use tracing::debug;
use usageline_core::usage::{
    default_credentials, FileCacheStore, HttpTransport, UsageFetcher, UsageProvider,
};
use usageline_core::{Clock, ContextEstimator, SystemClock};

use crate::config::Settings;
use crate::git::fetch_branch;
use crate::input::StatusInput;
use crate::render::{presenter_for, Palette, StatusView, ViewOptions};

/// Build the usage provider described by `settings`, or `None` when the
/// usage section is disabled
pub fn usage_provider(settings: &Settings) -> Option<UsageProvider> {
    if !settings.usage_enabled {
        return None;
    }
    let store = match &settings.cache_path {
        Some(path) => FileCacheStore::new(path),
        None => FileCacheStore::default(),
    };
    let fetcher = UsageFetcher::new(
        Box::new(default_credentials()),
        Box::new(HttpTransport::new(
            settings.usage_endpoint.as_str(),
            settings.http_timeout(),
        )),
    );
    Some(UsageProvider::new(
        Box::new(store),
        fetcher,
        Box::new(SystemClock),
    ))
}

/// Render the status text for `input`
pub fn render_status(
    input: &StatusInput,
    settings: &Settings,
    usage: Option<&UsageProvider>,
) -> String {
    let branch = if settings.display.show_branch {
        input.current_dir().and_then(fetch_branch)
    } else {
        None
    };

    let context = ContextEstimator::new(settings.context_window, settings.auto_compact_threshold)
        .estimate(input.transcript());

    let snapshot = usage.and_then(|provider| provider.get_usage(settings.cache_ttl()));
    debug!(
        "Render: context={} usage={}",
        context.is_some(),
        snapshot.is_some()
    );

    let options = ViewOptions {
        show_absolute_reset: settings.display.show_absolute_reset,
        max_dir_width: settings.display.max_dir_width,
    };
    let clock: &dyn Clock = usage.map(UsageProvider::clock).unwrap_or(&SystemClock);
    let view = StatusView::build(input, branch, context, snapshot.as_ref(), &options, clock);

    presenter_for(settings.display.style, Palette::new(settings.display.color)).render(&view)
}

/// Read the payload from `reader` and render it with the default providers
pub fn run(settings: &Settings, reader: impl Read) -> String {
    let input = StatusInput::from_reader(reader);
    let provider = usage_provider(settings);
    render_status(&input, settings, provider.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::Path;

    use usageline_core::usage::{CacheStore, FileCredentials, UsageTransport};
    use usageline_core::{FixedClock, StatusError, UsageSnapshot};

    const NOW: i64 = 1_764_950_000;

    /// Fails the test if a request is ever attempted
    struct NoNetwork;

    impl UsageTransport for NoNetwork {
        fn get_usage(&self, _token: &str) -> Result<String, StatusError> {
            panic!("network must not be touched");
        }
    }

    fn settings() -> Settings {
        let mut settings = Settings::default();
        settings.display.color = false;
        settings.display.show_branch = false;
        settings
    }

    fn offline_provider(cache: &Path, credentials: &Path) -> UsageProvider {
        UsageProvider::new(
            Box::new(FileCacheStore::new(cache)),
            UsageFetcher::new(
                Box::new(FileCredentials::new(credentials)),
                Box::new(NoNetwork),
            ),
            Box::new(FixedClock::at_epoch(NOW)),
        )
    }

    fn seed(cache: &Path, seven_day: Option<f64>, opus: Option<f64>, sonnet: Option<f64>) {
        FileCacheStore::new(cache)
            .write(&UsageSnapshot {
                fetched_at: NOW - 10,
                five_hour_utilization: 44.0,
                five_hour_reset_at: None,
                seven_day_utilization: seven_day,
                seven_day_reset_at: None,
                seven_day_opus_utilization: opus,
                seven_day_sonnet_utilization: sonnet,
            })
            .unwrap();
    }

    fn input() -> StatusInput {
        StatusInput::parse(
            r#"{"model":{"id":"claude-opus-4-1","display_name":"Opus"},"workspace":{"current_dir":"/work/usageline"}}"#,
        )
    }

    #[test]
    fn test_missing_credential_still_prints_base_line() {
        let dir = tempfile::tempdir().unwrap();
        let provider = offline_provider(
            &dir.path().join("usage.json"),
            &dir.path().join("no-credentials.json"),
        );

        let out = render_status(&input(), &settings(), Some(&provider));
        assert_eq!(out, "Opus │ usageline");
    }

    #[test]
    fn test_basic_tier_shows_only_five_hour() {
        let dir = tempfile::tempdir().unwrap();
        let cache = dir.path().join("usage.json");
        seed(&cache, None, None, None);
        let provider = offline_provider(&cache, &dir.path().join("none.json"));

        let out = render_status(&input(), &settings(), Some(&provider));
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines, vec!["Opus │ usageline", "5h 44%"]);
        assert!(!out.contains("7d"));
        assert!(!out.contains("Sonnet"));
    }

    #[test]
    fn test_higher_tier_model_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let cache = dir.path().join("usage.json");
        seed(&cache, Some(18.0), None, Some(13.0));
        let provider = offline_provider(&cache, &dir.path().join("none.json"));

        let out = render_status(&input(), &settings(), Some(&provider));
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[2], "7d 18%");
        assert_eq!(lines[3], "Opus 18% · Sonnet 13%");
    }

    #[test]
    fn test_context_line_from_transcript() {
        let dir = tempfile::tempdir().unwrap();
        let transcript = dir.path().join("session.jsonl");
        std::fs::write(
            &transcript,
            concat!(
                r#"{"type":"assistant","message":{"usage":{"input_tokens":1,"cache_read_input_tokens":160000,"cache_creation_input_tokens":0}}}"#,
                "\n",
                r#"{"type":"assistant","isSidechain":true,"message":{"usage":{"input_tokens":5}}}"#,
                "\n"
            ),
        )
        .unwrap();
        let input = StatusInput::parse(&format!(
            r#"{{"model":{{"id":"claude-sonnet-4-5"}},"transcript_path":{:?}}}"#,
            transcript.to_string_lossy()
        ));

        let out = render_status(&input, &settings(), None);
        assert_eq!(out, "claude-sonnet-4-5 │ ctx 80% (160k) ⚠");
    }

    #[test]
    fn test_disabled_usage_has_no_provider() {
        let mut settings = settings();
        settings.usage_enabled = false;
        assert!(usage_provider(&settings).is_none());
    }

    #[test]
    fn test_run_with_garbage_stdin() {
        let mut settings = settings();
        settings.usage_enabled = false;
        let out = run(&settings, "this is not json".as_bytes());
        assert_eq!(out, "Claude");
    }

    #[test]
    fn test_cache_path_override_is_used() {
        let dir = tempfile::tempdir().unwrap();
        let cache = dir.path().join("custom.json");
        seed(&cache, None, None, None);
        let mut settings = settings();
        settings.cache_path = Some(cache.clone());
        settings.cache_ttl_secs = u64::MAX / 2;

        // TTL long enough that the seeded entry is fresh on the real clock
        let provider = usage_provider(&settings).unwrap();
        let out = render_status(&input(), &settings, Some(&provider));
        assert!(out.contains("5h 44%"));
        assert!(FileCacheStore::new(&cache).read().is_some());
    }

    #[test]
    fn test_countdown_uses_provider_clock() {
        let dir = tempfile::tempdir().unwrap();
        let cache = dir.path().join("usage.json");
        FileCacheStore::new(&cache)
            .write(&UsageSnapshot {
                fetched_at: NOW - 10,
                five_hour_utilization: 44.0,
                // NOW is 15:53:20Z
                five_hour_reset_at: Some("2025-12-05T18:00:00Z".to_string()),
                seven_day_utilization: None,
                seven_day_reset_at: None,
                seven_day_opus_utilization: None,
                seven_day_sonnet_utilization: None,
            })
            .unwrap();
        let provider = offline_provider(&cache, &dir.path().join("none.json"));
        let mut settings = settings();
        settings.display.show_absolute_reset = false;

        let out = render_status(&input(), &settings, Some(&provider));
        assert_eq!(out.lines().nth(1), Some("5h 44% ⏱ 2h6m"));
    }
}
