//! ==============================================================================
//! dashboard.rs - view model and html rendering
//! ==============================================================================
//!
//! purpose:
//!     turns a raw SensorSnapshot (v0..v15) into what the dashboard shows:
//!     environmental cards, three soil gauges and the device clock.
//!
//! relationships:
//!     - used by: server.rs (/api/dashboard and /)
//!     - uses: domain.rs (SensorSnapshot)
//!
//! ==============================================================================

use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::Serialize;

use crate::domain::SensorSnapshot;

// ==============================================================================
// view model
// ==============================================================================

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub temperature: f64,
    pub humidity: f64,
    pub pressure: f64,
    pub altitude: f64,
    pub soil_moisture: SoilMoisture,
    pub rtc_time: RtcTime,
    /// host wall clock when the snapshot was taken, HH:MM:SS
    pub last_update: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SoilMoisture {
    pub soil1: SoilProbe,
    pub soil2: SoilProbe,
    pub soil3: SoilProbe,
}

impl SoilMoisture {
    pub fn probes(&self) -> [(u8, &SoilProbe); 3] {
        [(1, &self.soil1), (2, &self.soil2), (3, &self.soil3)]
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SoilProbe {
    pub percentage: f64,
    pub raw: f64,
    pub status: MoistureStatus,
}

impl SoilProbe {
    fn new(percentage: f64, raw: f64) -> Self {
        Self {
            percentage,
            raw,
            status: MoistureStatus::classify(percentage),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum MoistureStatus {
    #[serde(rename = "Very Dry")]
    VeryDry,
    Dry,
    Moist,
    Wet,
}

impl MoistureStatus {
    pub fn classify(percentage: f64) -> Self {
        if percentage < 25.0 {
            MoistureStatus::VeryDry
        } else if percentage < 50.0 {
            MoistureStatus::Dry
        } else if percentage < 75.0 {
            MoistureStatus::Moist
        } else {
            MoistureStatus::Wet
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MoistureStatus::VeryDry => "Very Dry",
            MoistureStatus::Dry => "Dry",
            MoistureStatus::Moist => "Moist",
            MoistureStatus::Wet => "Wet",
        }
    }

    fn color(self) -> &'static str {
        match self {
            MoistureStatus::VeryDry => "#ef4444",
            MoistureStatus::Dry => "#f97316",
            MoistureStatus::Moist => "#84cc16",
            MoistureStatus::Wet => "#22c55e",
        }
    }
}

/// device real-time clock (v10..v15)
///
/// numeric fields fall back to the host clock when the device reports 0.
/// the formatted strings use the device values as-is.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RtcTime {
    pub year: i64,
    pub month: i64,
    pub day: i64,
    pub hour: i64,
    pub minute: i64,
    pub second: i64,
    pub formatted: String,
    pub full_formatted: String,
}

impl RtcTime {
    pub fn from_snapshot(snapshot: &SensorSnapshot, now: NaiveDateTime) -> Self {
        let or_now = |device: f64, host: i64| {
            let device = device as i64;
            if device == 0 {
                host
            } else {
                device
            }
        };

        let formatted = format!(
            "{:02}:{:02}:{:02}",
            snapshot.hour as i64, snapshot.minute as i64, snapshot.second as i64
        );
        let full_formatted = format!(
            "{}-{:02}-{:02}",
            snapshot.year as i64, snapshot.month as i64, snapshot.day as i64
        );

        Self {
            year: or_now(snapshot.year, now.year() as i64),
            month: or_now(snapshot.month, now.month() as i64),
            day: or_now(snapshot.day, now.day() as i64),
            hour: or_now(snapshot.hour, now.hour() as i64),
            minute: or_now(snapshot.minute, now.minute() as i64),
            second: or_now(snapshot.second, now.second() as i64),
            formatted,
            full_formatted,
        }
    }
}

impl DashboardStats {
    pub fn from_snapshot(snapshot: &SensorSnapshot, now: NaiveDateTime) -> Self {
        Self {
            temperature: snapshot.temperature,
            humidity: snapshot.humidity,
            pressure: snapshot.pressure,
            altitude: snapshot.altitude,
            soil_moisture: SoilMoisture {
                soil1: SoilProbe::new(snapshot.soil1_percentage, snapshot.soil1_raw),
                soil2: SoilProbe::new(snapshot.soil2_percentage, snapshot.soil2_raw),
                soil3: SoilProbe::new(snapshot.soil3_percentage, snapshot.soil3_raw),
            },
            rtc_time: RtcTime::from_snapshot(snapshot, now),
            last_update: now.format("%H:%M:%S").to_string(),
        }
    }
}

// ==============================================================================
// html rendering
// ==============================================================================

/// what the page knows about the last poll
pub enum PageState<'a> {
    Online(&'a DashboardStats),
    Offline { error: &'a str },
}

/// render the full dashboard page
///
/// the page re-requests itself every `refresh_seconds`.
pub fn render_page(state: PageState<'_>, refresh_seconds: u64) -> String {
    let (status, body) = match state {
        PageState::Online(stats) => (
            render_status(true, &stats.last_update, Some(&stats.rtc_time)),
            render_stats(stats),
        ),
        PageState::Offline { error } => (
            render_status(false, "unavailable", None),
            format!(r#"<pre class="error">{}</pre>"#, html_escape(error)),
        ),
    };

    format!(
        r#"<!doctype html>
<html>
<head>
    <meta charset="utf-8">
    <meta http-equiv="refresh" content="{refresh}">
    <title>FloraPro</title>
    <style>
        body {{ font-family: system-ui; margin: 0; padding: 2rem; background: #f1f5f9; color: #1e293b; }}
        h1 {{ text-align: center; color: #059669; margin-bottom: 0; }}
        .subtitle {{ text-align: center; color: #64748b; margin-top: .25rem; }}
        .status {{ display: flex; gap: 1rem; justify-content: center; margin: 1.5rem 0; }}
        .pill {{ background: #fff; border-radius: 1rem; padding: .5rem 1rem; box-shadow: 0 1px 3px #0002; }}
        .online {{ color: #15803d; }} .offline {{ color: #b91c1c; }}
        .grid {{ display: grid; grid-template-columns: repeat(auto-fit, minmax(14rem, 1fr)); gap: 1.5rem; max-width: 72rem; margin: 0 auto 2rem; }}
        .card {{ background: #fff; border-radius: 1rem; padding: 1.25rem; box-shadow: 0 1px 3px #0002; }}
        .card h3 {{ margin: 0 0 .5rem; font-size: 1rem; color: #475569; }}
        .value {{ font-size: 2rem; font-weight: 700; }}
        .unit {{ font-size: 1rem; color: #64748b; }}
        .bar {{ height: .75rem; border-radius: .5rem; background: #e2e8f0; overflow: hidden; margin: .75rem 0; }}
        .bar > div {{ height: 100%; }}
        .error {{ background: #fee2e2; padding: 1rem; border-radius: .5rem; max-width: 72rem; margin: 0 auto; white-space: pre-wrap; }}
    </style>
</head>
<body>
    <h1>FloraPro</h1>
    <p class="subtitle">Intelligent Environmental Monitoring System</p>
    {status}
    {body}
</body>
</html>"#,
        refresh = refresh_seconds,
        status = status,
        body = body,
    )
}

fn render_status(online: bool, last_update: &str, rtc: Option<&RtcTime>) -> String {
    let (class, label) = if online { ("online", "Online") } else { ("offline", "Offline") };
    let clock = rtc
        .map(|t| format!(r#"<span class="pill">Device Time <b>{}</b></span>"#, html_escape(&t.formatted)))
        .unwrap_or_default();

    format!(
        r#"<div class="status"><span class="pill {class}">{label}</span><span class="pill">Updated: <b>{updated}</b></span>{clock}</div>"#,
        class = class,
        label = label,
        updated = html_escape(last_update),
        clock = clock,
    )
}

fn render_stats(stats: &DashboardStats) -> String {
    // (title, value, decimals, unit, description)
    let cards = [
        ("Temperature", stats.temperature, 1usize, "°C", "Ambient temperature from AHT20 sensor"),
        ("Humidity", stats.humidity, 1, "%", "Relative humidity from AHT20 sensor"),
        ("Pressure", stats.pressure, 0, "hPa", "Atmospheric pressure from BMP280 sensor"),
        ("Altitude", stats.altitude, 0, "m", "Estimated altitude from BMP280 sensor"),
    ]
    .iter()
    .map(|(title, value, decimals, unit, description)| {
        format!(
            r#"<div class="card"><h3>{}</h3><div class="value">{:.*} <span class="unit">{}</span></div><small>{}</small></div>"#,
            title, *decimals, value, unit, description
        )
    })
    .collect::<String>();

    let gauges = stats
        .soil_moisture
        .probes()
        .iter()
        .map(|(n, probe)| {
            let fill = probe.percentage.clamp(0.0, 100.0);
            format!(
                r#"<div class="card"><h3>Soil {n}</h3><div class="value">{pct}<span class="unit">%</span></div><div class="bar"><div style="width: {fill}%; background: {color}"></div></div><div>Raw Value: <b>{raw}</b></div><div style="color: {color}">{status}</div></div>"#,
                n = n,
                pct = probe.percentage,
                fill = fill,
                color = probe.status.color(),
                raw = probe.raw,
                status = probe.status.label(),
            )
        })
        .collect::<String>();

    format!(
        r#"<div class="grid">{}</div><h2 style="text-align: center">Soil Moisture Monitoring</h2><div class="grid">{}</div>"#,
        cards, gauges
    )
}

/// escape html special characters to prevent xss
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
     .replace('<', "&lt;")
     .replace('>', "&gt;")
     .replace('"', "&quot;")
}
