use serde::{Deserialize, Serialize};

/// number of virtual pins exposed by the device
pub const CHANNEL_COUNT: usize = 16;

/// a blynk virtual pin, v0..v15
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelId {
    V0,
    V1,
    V2,
    V3,
    V4,
    V5,
    V6,
    V7,
    V8,
    V9,
    V10,
    V11,
    V12,
    V13,
    V14,
    V15,
}

/// what the firmware writes to each pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelMeaning {
    Temperature,
    Humidity,
    Pressure,
    Altitude,
    Soil1Percentage,
    Soil2Percentage,
    Soil3Percentage,
    Soil1Raw,
    Soil2Raw,
    Soil3Raw,
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
}

impl ChannelId {
    /// every pin, in snapshot order
    pub const ALL: [ChannelId; CHANNEL_COUNT] = [
        ChannelId::V0,
        ChannelId::V1,
        ChannelId::V2,
        ChannelId::V3,
        ChannelId::V4,
        ChannelId::V5,
        ChannelId::V6,
        ChannelId::V7,
        ChannelId::V8,
        ChannelId::V9,
        ChannelId::V10,
        ChannelId::V11,
        ChannelId::V12,
        ChannelId::V13,
        ChannelId::V14,
        ChannelId::V15,
    ];

    /// position in `ALL` and in the snapshot
    pub const fn index(self) -> usize {
        self as usize
    }

    /// identifier used in the relay url
    pub const fn pin(self) -> &'static str {
        match self {
            ChannelId::V0 => "v0",
            ChannelId::V1 => "v1",
            ChannelId::V2 => "v2",
            ChannelId::V3 => "v3",
            ChannelId::V4 => "v4",
            ChannelId::V5 => "v5",
            ChannelId::V6 => "v6",
            ChannelId::V7 => "v7",
            ChannelId::V8 => "v8",
            ChannelId::V9 => "v9",
            ChannelId::V10 => "v10",
            ChannelId::V11 => "v11",
            ChannelId::V12 => "v12",
            ChannelId::V13 => "v13",
            ChannelId::V14 => "v14",
            ChannelId::V15 => "v15",
        }
    }

    pub const fn meaning(self) -> ChannelMeaning {
        match self {
            ChannelId::V0 => ChannelMeaning::Temperature,
            ChannelId::V1 => ChannelMeaning::Humidity,
            ChannelId::V2 => ChannelMeaning::Pressure,
            ChannelId::V3 => ChannelMeaning::Altitude,
            ChannelId::V4 => ChannelMeaning::Soil1Percentage,
            ChannelId::V5 => ChannelMeaning::Soil2Percentage,
            ChannelId::V6 => ChannelMeaning::Soil3Percentage,
            ChannelId::V7 => ChannelMeaning::Soil1Raw,
            ChannelId::V8 => ChannelMeaning::Soil2Raw,
            ChannelId::V9 => ChannelMeaning::Soil3Raw,
            ChannelId::V10 => ChannelMeaning::Year,
            ChannelId::V11 => ChannelMeaning::Month,
            ChannelId::V12 => ChannelMeaning::Day,
            ChannelId::V13 => ChannelMeaning::Hour,
            ChannelId::V14 => ChannelMeaning::Minute,
            ChannelId::V15 => ChannelMeaning::Second,
        }
    }

    pub const fn label(self) -> &'static str {
        self.meaning().label()
    }

    pub fn from_pin(pin: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.pin().eq_ignore_ascii_case(pin))
    }
}

impl std::fmt::Display for ChannelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.pin())
    }
}

impl ChannelMeaning {
    pub const fn label(self) -> &'static str {
        match self {
            ChannelMeaning::Temperature => "temperature (AHT20)",
            ChannelMeaning::Humidity => "humidity (AHT20)",
            ChannelMeaning::Pressure => "pressure (BMP280)",
            ChannelMeaning::Altitude => "altitude (BMP280)",
            ChannelMeaning::Soil1Percentage => "soil 1 moisture %",
            ChannelMeaning::Soil2Percentage => "soil 2 moisture %",
            ChannelMeaning::Soil3Percentage => "soil 3 moisture %",
            ChannelMeaning::Soil1Raw => "soil 1 raw value",
            ChannelMeaning::Soil2Raw => "soil 2 raw value",
            ChannelMeaning::Soil3Raw => "soil 3 raw value",
            ChannelMeaning::Year => "rtc year",
            ChannelMeaning::Month => "rtc month",
            ChannelMeaning::Day => "rtc day",
            ChannelMeaning::Hour => "rtc hour",
            ChannelMeaning::Minute => "rtc minute",
            ChannelMeaning::Second => "rtc second",
        }
    }
}

/// one complete poll of all sixteen pins
///
/// only built from a full set of readings; a failed pin reads as 0.0.
/// serialises under the pin names so the api payload stays `{ v0, .., v15 }`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorSnapshot {
    #[serde(rename = "v0")]
    pub temperature: f64,
    #[serde(rename = "v1")]
    pub humidity: f64,
    #[serde(rename = "v2")]
    pub pressure: f64,
    #[serde(rename = "v3")]
    pub altitude: f64,
    #[serde(rename = "v4")]
    pub soil1_percentage: f64,
    #[serde(rename = "v5")]
    pub soil2_percentage: f64,
    #[serde(rename = "v6")]
    pub soil3_percentage: f64,
    #[serde(rename = "v7")]
    pub soil1_raw: f64,
    #[serde(rename = "v8")]
    pub soil2_raw: f64,
    #[serde(rename = "v9")]
    pub soil3_raw: f64,
    #[serde(rename = "v10")]
    pub year: f64,
    #[serde(rename = "v11")]
    pub month: f64,
    #[serde(rename = "v12")]
    pub day: f64,
    #[serde(rename = "v13")]
    pub hour: f64,
    #[serde(rename = "v14")]
    pub minute: f64,
    #[serde(rename = "v15")]
    pub second: f64,
}

impl SensorSnapshot {
    /// assemble from readings ordered like `ChannelId::ALL`
    pub fn from_readings(readings: [f64; CHANNEL_COUNT]) -> Self {
        let [
            temperature,
            humidity,
            pressure,
            altitude,
            soil1_percentage,
            soil2_percentage,
            soil3_percentage,
            soil1_raw,
            soil2_raw,
            soil3_raw,
            year,
            month,
            day,
            hour,
            minute,
            second,
        ] = readings;
        Self {
            temperature,
            humidity,
            pressure,
            altitude,
            soil1_percentage,
            soil2_percentage,
            soil3_percentage,
            soil1_raw,
            soil2_raw,
            soil3_raw,
            year,
            month,
            day,
            hour,
            minute,
            second,
        }
    }

    pub fn get(&self, channel: ChannelId) -> f64 {
        match channel.meaning() {
            ChannelMeaning::Temperature => self.temperature,
            ChannelMeaning::Humidity => self.humidity,
            ChannelMeaning::Pressure => self.pressure,
            ChannelMeaning::Altitude => self.altitude,
            ChannelMeaning::Soil1Percentage => self.soil1_percentage,
            ChannelMeaning::Soil2Percentage => self.soil2_percentage,
            ChannelMeaning::Soil3Percentage => self.soil3_percentage,
            ChannelMeaning::Soil1Raw => self.soil1_raw,
            ChannelMeaning::Soil2Raw => self.soil2_raw,
            ChannelMeaning::Soil3Raw => self.soil3_raw,
            ChannelMeaning::Year => self.year,
            ChannelMeaning::Month => self.month,
            ChannelMeaning::Day => self.day,
            ChannelMeaning::Hour => self.hour,
            ChannelMeaning::Minute => self.minute,
            ChannelMeaning::Second => self.second,
        }
    }

    /// readings in pin order
    pub fn readings(&self) -> [f64; CHANNEL_COUNT] {
        ChannelId::ALL.map(|c| self.get(c))
    }
}
