//! Randomized telemetry for the network and threat widgets
//!
//! Nothing here is backed by real sensors. Every value is drawn from one of
//! the bounds below, and every generator takes the RNG so tests can seed it.

use chrono::{DateTime, Duration, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use std::ops::RangeInclusive;

pub const ACTIVE_SESSIONS: RangeInclusive<u32> = 15_000..=20_000;
pub const FLOWS_PER_SECOND: RangeInclusive<u32> = 800..=1_500;
pub const TOTAL_BYTES: RangeInclusive<u64> = 1_000_000_000..=5_000_000_000;
pub const TALKER_BYTES: RangeInclusive<u64> = 10_000_000..=500_000_000;
pub const TALKER_CONNECTIONS: RangeInclusive<u32> = 10..=2_000;
pub const TOP_TALKERS: usize = 5;

pub const TRAFFIC_POINTS: usize = 12;
pub const TRAFFIC_STEP_MINUTES: i64 = 5;
pub const INBOUND_MBPS: RangeInclusive<f64> = 200.0..=800.0;
pub const OUTBOUND_MBPS: RangeInclusive<f64> = 100.0..=500.0;

pub const BANDWIDTH_UTILIZATION: RangeInclusive<f64> = 30.0..=90.0;
pub const PACKET_LOSS: RangeInclusive<f64> = 0.0..=2.0;
pub const LATENCY_MS: RangeInclusive<f64> = 5.0..=50.0;
pub const JITTER_MS: RangeInclusive<f64> = 0.0..=10.0;
pub const THROUGHPUT_MBPS: RangeInclusive<f64> = 400.0..=1_200.0;

pub const MAX_ANOMALIES: usize = 5;
pub const ANOMALY_SCORE: RangeInclusive<f64> = 0.5..=1.0;

pub const INDICATORS: usize = 10;
pub const CONFIDENCE: RangeInclusive<u8> = 50..=100;
pub const FEED_INDICATORS: RangeInclusive<u32> = 1_000..=50_000;

pub const RISK_SCORE: RangeInclusive<u8> = 0..=100;
pub const VECTOR_COUNT: RangeInclusive<u32> = 0..=100;

const PROTOCOLS: &[&str] = &["HTTPS", "HTTP", "DNS", "SSH", "SMTP"];
const ANOMALY_KINDS: &[(&str, &str)] = &[
    ("port_scan", "Sequential connection attempts across many ports"),
    ("traffic_spike", "Outbound volume far above the hourly baseline"),
    ("dns_tunneling", "High-entropy DNS queries to a single domain"),
    ("beaconing", "Periodic connections to an external host"),
    ("lateral_movement", "Internal host contacting many peers over SMB"),
];
const THREAT_TYPES: &[&str] = &["malware", "phishing", "botnet", "c2", "scanner", "ransomware"];
const FEEDS: &[&str] = &["AlienVault OTX", "Abuse.ch", "MISP Community", "Emerging Threats"];
const DOMAIN_WORDS: &[&str] = &["secure", "login", "update", "cdn", "mail", "verify", "cloud"];
const TLDS: &[&str] = &["com", "net", "xyz", "top", "ru", "info"];
const ATTACK_VECTORS: &[&str] = &[
    "Phishing",
    "Brute Force",
    "Malware",
    "Exploitation",
    "Insider Threat",
    "DDoS",
];

/// Rounds to `places` decimals; stays inside any range whose ends have at most that many
fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

fn random_ip(rng: &mut impl Rng) -> String {
    format!(
        "{}.{}.{}.{}",
        rng.gen_range(1..=223u8),
        rng.gen::<u8>(),
        rng.gen::<u8>(),
        rng.gen_range(1..=254u8)
    )
}

fn pick<'a>(rng: &mut impl Rng, items: &'a [&'a str]) -> &'a str {
    items.choose(rng).copied().unwrap_or_default()
}

#[derive(Debug, Clone, Serialize)]
pub struct ProtocolShare {
    pub protocol: String,
    pub percentage: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct TopTalker {
    pub ip: String,
    pub bytes: u64,
    pub connections: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkFlows {
    pub active_sessions: u32,
    pub flows_per_second: u32,
    pub total_bytes: u64,
    pub top_protocols: Vec<ProtocolShare>,
    pub top_talkers: Vec<TopTalker>,
    pub timestamp: DateTime<Utc>,
}

pub fn network_flows(rng: &mut impl Rng, now: DateTime<Utc>) -> NetworkFlows {
    let weights: Vec<u32> = PROTOCOLS.iter().map(|_| rng.gen_range(1..=100)).collect();
    let sum: u32 = weights.iter().sum();
    let mut shares: Vec<u32> = weights.iter().map(|w| w * 100 / sum).collect();
    // Integer division leaves a remainder; the heaviest protocol absorbs it
    let remainder = 100 - shares.iter().sum::<u32>();
    if let Some((i, _)) = weights.iter().enumerate().max_by_key(|(_, w)| **w) {
        shares[i] += remainder;
    }

    let mut top_protocols: Vec<ProtocolShare> = PROTOCOLS
        .iter()
        .zip(shares)
        .map(|(p, percentage)| ProtocolShare {
            protocol: p.to_string(),
            percentage,
        })
        .collect();
    top_protocols.sort_by(|a, b| b.percentage.cmp(&a.percentage));

    let mut top_talkers: Vec<TopTalker> = (0..TOP_TALKERS)
        .map(|_| TopTalker {
            ip: random_ip(rng),
            bytes: rng.gen_range(TALKER_BYTES),
            connections: rng.gen_range(TALKER_CONNECTIONS),
        })
        .collect();
    top_talkers.sort_by(|a, b| b.bytes.cmp(&a.bytes));

    NetworkFlows {
        active_sessions: rng.gen_range(ACTIVE_SESSIONS),
        flows_per_second: rng.gen_range(FLOWS_PER_SECOND),
        total_bytes: rng.gen_range(TOTAL_BYTES),
        top_protocols,
        top_talkers,
        timestamp: now,
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrafficPoint {
    pub timestamp: DateTime<Utc>,
    pub inbound_mbps: f64,
    pub outbound_mbps: f64,
}

/// Five-minute points, oldest first, the last one at `now`
pub fn network_traffic(rng: &mut impl Rng, now: DateTime<Utc>) -> Vec<TrafficPoint> {
    (0..TRAFFIC_POINTS)
        .rev()
        .map(|back| TrafficPoint {
            timestamp: now - Duration::minutes(TRAFFIC_STEP_MINUTES * back as i64),
            inbound_mbps: round_to(rng.gen_range(INBOUND_MBPS), 1),
            outbound_mbps: round_to(rng.gen_range(OUTBOUND_MBPS), 1),
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkMetrics {
    pub bandwidth_utilization: f64,
    pub packet_loss: f64,
    pub latency_ms: f64,
    pub jitter_ms: f64,
    pub throughput_mbps: f64,
    pub timestamp: DateTime<Utc>,
}

pub fn network_metrics(rng: &mut impl Rng, now: DateTime<Utc>) -> NetworkMetrics {
    NetworkMetrics {
        bandwidth_utilization: round_to(rng.gen_range(BANDWIDTH_UTILIZATION), 1),
        packet_loss: round_to(rng.gen_range(PACKET_LOSS), 2),
        latency_ms: round_to(rng.gen_range(LATENCY_MS), 1),
        jitter_ms: round_to(rng.gen_range(JITTER_MS), 1),
        throughput_mbps: round_to(rng.gen_range(THROUGHPUT_MBPS), 1),
        timestamp: now,
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Anomaly {
    pub id: String,
    pub kind: String,
    pub description: String,
    pub source_ip: String,
    pub score: f64,
    pub detected_at: DateTime<Utc>,
}

pub fn network_anomalies(rng: &mut impl Rng, now: DateTime<Utc>) -> Vec<Anomaly> {
    let count = rng.gen_range(0..=MAX_ANOMALIES);
    (0..count)
        .map(|_| {
            let (kind, description) = ANOMALY_KINDS
                .choose(rng)
                .copied()
                .unwrap_or(ANOMALY_KINDS[0]);
            Anomaly {
                id: format!("anom-{}", uuid::Uuid::new_v4()),
                kind: kind.to_string(),
                description: description.to_string(),
                source_ip: random_ip(rng),
                score: round_to(rng.gen_range(ANOMALY_SCORE), 2),
                detected_at: now - Duration::seconds(rng.gen_range(0..3_600)),
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IndicatorType {
    Ip,
    Domain,
    Hash,
    Url,
}

impl IndicatorType {
    const ALL: [IndicatorType; 4] = [Self::Ip, Self::Domain, Self::Hash, Self::Url];
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Indicator {
    pub id: String,
    #[serde(rename = "type")]
    pub indicator_type: IndicatorType,
    pub value: String,
    pub threat_type: String,
    pub confidence: u8,
    pub source: String,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreatFeed {
    pub name: String,
    pub indicator_count: u32,
    pub status: &'static str,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ThreatIntel {
    pub indicators: Vec<Indicator>,
    pub feeds: Vec<ThreatFeed>,
}

fn indicator_value(rng: &mut impl Rng, kind: IndicatorType) -> String {
    match kind {
        IndicatorType::Ip => random_ip(rng),
        IndicatorType::Domain => format!(
            "{}-{}{}.{}",
            pick(rng, DOMAIN_WORDS),
            pick(rng, DOMAIN_WORDS),
            rng.gen_range(1..=99u8),
            pick(rng, TLDS)
        ),
        IndicatorType::Hash => (0..32).map(|_| format!("{:02x}", rng.gen::<u8>())).collect(),
        IndicatorType::Url => format!(
            "http://{}/{}.php",
            random_ip(rng),
            pick(rng, DOMAIN_WORDS)
        ),
    }
}

pub fn threat_intel(rng: &mut impl Rng, now: DateTime<Utc>) -> ThreatIntel {
    let indicators = (0..INDICATORS)
        .map(|_| {
            let kind = IndicatorType::ALL
                .choose(rng)
                .copied()
                .unwrap_or(IndicatorType::Ip);
            let last_seen = now - Duration::minutes(rng.gen_range(0..1_440));
            Indicator {
                id: format!("ioc-{}", uuid::Uuid::new_v4()),
                indicator_type: kind,
                value: indicator_value(rng, kind),
                threat_type: pick(rng, THREAT_TYPES).to_string(),
                confidence: rng.gen_range(CONFIDENCE),
                source: pick(rng, FEEDS).to_string(),
                first_seen: last_seen - Duration::days(rng.gen_range(0..30)),
                last_seen,
            }
        })
        .collect();

    let feeds = FEEDS
        .iter()
        .map(|name| ThreatFeed {
            name: name.to_string(),
            indicator_count: rng.gen_range(FEED_INDICATORS),
            status: "active",
            last_updated: now - Duration::minutes(rng.gen_range(0..120)),
        })
        .collect();

    ThreatIntel { indicators, feeds }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Stable,
}

#[derive(Debug, Clone, Serialize)]
pub struct AttackVector {
    pub vector: String,
    pub count: u32,
    pub trend: Trend,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreatAnalysis {
    pub risk_score: u8,
    pub threat_level: &'static str,
    pub attack_vectors: Vec<AttackVector>,
    pub recommendations: Vec<String>,
    pub analyzed_at: DateTime<Utc>,
}

/// `>= 75` critical, `>= 50` high, `>= 25` medium, else low
pub fn threat_level(risk_score: u8) -> &'static str {
    match risk_score {
        75..=u8::MAX => "critical",
        50..=74 => "high",
        25..=49 => "medium",
        _ => "low",
    }
}

pub fn threat_analysis(rng: &mut impl Rng, now: DateTime<Utc>) -> ThreatAnalysis {
    let risk_score = rng.gen_range(RISK_SCORE);
    let mut attack_vectors: Vec<AttackVector> = ATTACK_VECTORS
        .iter()
        .map(|v| AttackVector {
            vector: v.to_string(),
            count: rng.gen_range(VECTOR_COUNT),
            trend: [Trend::Up, Trend::Down, Trend::Stable]
                .choose(rng)
                .copied()
                .unwrap_or(Trend::Stable),
        })
        .collect();
    attack_vectors.sort_by(|a, b| b.count.cmp(&a.count));

    let recommendations = attack_vectors
        .iter()
        .filter(|v| v.trend == Trend::Up)
        .take(3)
        .map(|v| format!("Review controls against {} (trending up)", v.vector))
        .collect();

    ThreatAnalysis {
        risk_score,
        threat_level: threat_level(risk_score),
        attack_vectors,
        recommendations,
        analyzed_at: now,
    }
}
