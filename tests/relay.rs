mod common;

use std::time::{Duration, Instant};

use chrono::NaiveDate;
use common::{client, device_replies, MockRelay, Reply, TOKEN};
use flora_host::dashboard::DashboardStats;
use flora_host::domain::{ChannelId, CHANNEL_COUNT};
use flora_host::error::{ChannelFetchError, RelayError};
use serde_json::json;

#[tokio::test]
async fn device_readings_map_onto_snapshot() {
    let relay = MockRelay::start(&device_replies()).await;

    let snapshot = client()
        .fetch_all_channels(&relay.base_url(), TOKEN)
        .await
        .unwrap();

    assert_eq!(relay.hits(), CHANNEL_COUNT);
    assert_eq!(snapshot.temperature, 23.5);
    assert_eq!(snapshot.humidity, 60.2);
    assert_eq!(snapshot.soil1_percentage, 45.0);
    assert_eq!(snapshot.soil1_raw, 612.0);
    assert_eq!(snapshot.year, 2024.0);
    // unset pins fall back to zero
    assert_eq!(snapshot.pressure, 0.0);
    assert_eq!(snapshot.soil3_raw, 0.0);

    let now = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap().and_hms_opt(8, 0, 0).unwrap();
    let stats = DashboardStats::from_snapshot(&snapshot, now);
    assert_eq!(stats.temperature, 23.5);
    assert_eq!(stats.humidity, 60.2);
    assert_eq!(stats.soil_moisture.soil1.percentage, 45.0);
    assert_eq!(stats.soil_moisture.soil1.raw, 612.0);
    assert_eq!(stats.rtc_time.formatted, "14:30:00");
}

#[tokio::test]
async fn missing_configuration_makes_no_requests() {
    let relay = MockRelay::start(&device_replies()).await;
    let client = client();

    let err = client.fetch_all_channels("", TOKEN).await.unwrap_err();
    assert!(matches!(err, RelayError::Configuration(_)));

    let err = client.fetch_all_channels(&relay.base_url(), "").await.unwrap_err();
    assert!(matches!(err, RelayError::Configuration(_)));

    assert_eq!(relay.hits(), 0);
}

#[tokio::test]
async fn failing_channels_read_as_zero() {
    let relay = MockRelay::start(&[
        ("v0", Reply::Status(404)),
        ("v1", Reply::Status(500)),
        ("v2", Reply::Raw("not a number")),
        ("v3", Reply::Json(json!("offline"))),
        ("v4", Reply::Json(json!(55.5))),
    ])
    .await;
    let client = client();
    let base = relay.base_url();

    for channel in [ChannelId::V0, ChannelId::V1, ChannelId::V2, ChannelId::V3] {
        assert_eq!(client.fetch_channel(&base, TOKEN, channel).await, 0.0, "{}", channel);
    }

    let err = client.try_fetch_channel(&base, TOKEN, ChannelId::V0).await.unwrap_err();
    assert!(matches!(err, ChannelFetchError::Status(s) if s.as_u16() == 404));
    let err = client.try_fetch_channel(&base, TOKEN, ChannelId::V2).await.unwrap_err();
    assert!(matches!(err, ChannelFetchError::Parse(_)));

    // one bad pin does not affect its siblings
    let snapshot = client.fetch_all_channels(&base, TOKEN).await.unwrap();
    assert_eq!(snapshot.soil1_percentage, 55.5);
    assert_eq!(snapshot.readings().iter().filter(|v| **v != 0.0).count(), 1);
}

#[tokio::test]
async fn bare_and_array_bodies_are_equivalent() {
    let relay = MockRelay::start(&[
        ("v0", Reply::Raw("42.5")),
        ("v1", Reply::Json(json!([42.5]))),
        ("v2", Reply::Json(json!(["42.5"]))),
    ])
    .await;
    let client = client();
    let base = relay.base_url();

    for channel in [ChannelId::V0, ChannelId::V1, ChannelId::V2] {
        assert_eq!(client.fetch_channel(&base, TOKEN, channel).await, 42.5);
    }
}

#[tokio::test]
async fn slow_channel_times_out_alone() {
    let relay = MockRelay::start(&[
        ("v0", Reply::Delayed(2_000, Box::new(Reply::Json(json!(99))))),
        ("v1", Reply::Json(json!(60))),
    ])
    .await;
    let client = client().with_timeout(Duration::from_millis(200));
    let base = relay.base_url();

    let err = client.try_fetch_channel(&base, TOKEN, ChannelId::V0).await.unwrap_err();
    assert!(matches!(err, ChannelFetchError::Timeout(d) if d == Duration::from_millis(200)));

    let started = Instant::now();
    let snapshot = client.fetch_all_channels(&base, TOKEN).await.unwrap();
    assert!(started.elapsed() < Duration::from_millis(1_500));
    assert_eq!(snapshot.temperature, 0.0);
    assert_eq!(snapshot.humidity, 60.0);
}

#[tokio::test]
async fn channels_are_fetched_concurrently() {
    let mut replies: Vec<(&str, Reply)> = ChannelId::ALL
        .iter()
        .map(|c| (c.pin(), Reply::Delayed(100, Box::new(Reply::Json(json!(1))))))
        .collect();
    replies[3].1 = Reply::Delayed(600, Box::new(Reply::Json(json!(3))));
    let relay = MockRelay::start(&replies).await;

    let started = Instant::now();
    let snapshot = client().fetch_all_channels(&relay.base_url(), TOKEN).await.unwrap();
    let elapsed = started.elapsed();

    assert_eq!(snapshot.altitude, 3.0);
    assert!(elapsed >= Duration::from_millis(600));
    // sequential would be at least 600 + 15 * 100
    assert!(elapsed < Duration::from_millis(1_500), "took {:?}", elapsed);
}

#[tokio::test]
async fn consecutive_polls_are_identical() {
    let relay = MockRelay::start(&device_replies()).await;
    let client = client();

    let first = client.fetch_all_channels(&relay.base_url(), TOKEN).await.unwrap();
    let second = client.fetch_all_channels(&relay.base_url(), TOKEN).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(relay.hits(), 2 * CHANNEL_COUNT);
}

#[tokio::test]
async fn infinite_readings_serialise_as_zero() {
    let relay = MockRelay::start(&[
        ("v0", Reply::Json(json!(["Infinity"]))),
        ("v1", Reply::Json(json!("1e400"))),
        ("v2", Reply::Raw("\"-Infinity\"")),
        ("v3", Reply::Json(json!(120.5))),
    ])
    .await;

    let snapshot = client().fetch_all_channels(&relay.base_url(), TOKEN).await.unwrap();

    assert_eq!(snapshot.temperature, 0.0);
    assert_eq!(snapshot.humidity, 0.0);
    assert_eq!(snapshot.pressure, 0.0);
    assert_eq!(snapshot.altitude, 120.5);

    let json = serde_json::to_value(snapshot).unwrap();
    let fields = json.as_object().unwrap();
    assert_eq!(fields.len(), CHANNEL_COUNT);
    assert!(fields.values().all(|v| v.is_f64()), "{}", json);
}

#[tokio::test]
async fn wrong_token_yields_all_zero_snapshot() {
    let relay = MockRelay::start(&device_replies()).await;

    let snapshot = client()
        .fetch_all_channels(&relay.base_url(), "not-the-token")
        .await
        .unwrap();

    assert!(snapshot.readings().iter().all(|v| *v == 0.0));
}
