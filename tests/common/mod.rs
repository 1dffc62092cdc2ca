#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use route53_takeover::fingerprint::{FingerprintDb, FingerprintOracle, FingerprintSignature};
use route53_takeover::zones::{
    HostedZone, PaginationCursor, RecordPage, RecordSet, RecordType, ZonePage, ZoneProvider,
};
use route53_takeover::{OracleError, ProviderError};

pub fn zone(id: &str, name: &str, is_private: bool) -> HostedZone {
    HostedZone { id: id.to_string(), name: name.to_string(), is_private }
}

pub fn record(name: &str, record_type: RecordType, set_identifier: Option<&str>) -> RecordSet {
    RecordSet {
        name: name.to_string(),
        record_type,
        set_identifier: set_identifier.map(str::to_string),
        values: Vec::new(),
    }
}

pub fn cname(name: &str) -> RecordSet {
    record(name, RecordType::Cname, None)
}

/// CNAME record carrying its target, as Route 53 returns it.
pub fn cname_to(name: &str, target: &str) -> RecordSet {
    RecordSet { values: vec![target.to_string()], ..cname(name) }
}

type SortKey = (String, RecordType, Option<String>);

fn key(r: &RecordSet) -> SortKey {
    (r.name.clone(), r.record_type.clone(), r.set_identifier.clone())
}

fn cursor_key(c: &PaginationCursor) -> SortKey {
    (c.next_name.clone(), c.next_type.clone(), c.next_identifier.clone())
}

/// In-memory account that pages like Route 53: record sets ordered by
/// (name, type, set identifier), each truncated page naming the first
/// record of the next page.
#[derive(Default)]
pub struct FakeProvider {
    zones: Vec<HostedZone>,
    zone_page_size: usize,
    records: HashMap<String, Vec<RecordSet>>,
    page_size: usize,
    failing_zones: HashSet<String>,
    panicking_zones: HashSet<String>,
    fail_zone_listing: bool,
    pub cursors_seen: Mutex<Vec<(String, Option<PaginationCursor>)>>,
    pub zone_pages_served: AtomicUsize,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self { zone_page_size: 100, page_size: 100, ..Default::default() }
    }

    pub fn with_zone(mut self, zone: HostedZone, mut records: Vec<RecordSet>) -> Self {
        records.sort_by_key(key);
        self.records.insert(zone.id.clone(), records);
        self.zones.push(zone);
        self
    }

    pub fn with_page_size(mut self, size: usize) -> Self {
        self.page_size = size;
        self
    }

    pub fn with_zone_page_size(mut self, size: usize) -> Self {
        self.zone_page_size = size;
        self
    }

    pub fn failing_zone(mut self, zone_id: &str) -> Self {
        self.failing_zones.insert(zone_id.to_string());
        self
    }

    pub fn panicking_zone(mut self, zone_id: &str) -> Self {
        self.panicking_zones.insert(zone_id.to_string());
        self
    }

    pub fn failing_zone_listing(mut self) -> Self {
        self.fail_zone_listing = true;
        self
    }
}

#[async_trait]
impl ZoneProvider for FakeProvider {
    async fn list_zones_page(&self, marker: Option<String>) -> Result<ZonePage, ProviderError> {
        if self.fail_zone_listing {
            return Err(ProviderError::new("ListHostedZones", "AccessDenied"));
        }
        self.zone_pages_served.fetch_add(1, Ordering::SeqCst);
        let start: usize = marker.map(|m| m.parse().unwrap()).unwrap_or(0);
        let end = (start + self.zone_page_size).min(self.zones.len());
        Ok(ZonePage {
            zones: self.zones[start..end].to_vec(),
            next_marker: (end < self.zones.len()).then(|| end.to_string()),
        })
    }

    async fn list_records_page(
        &self,
        zone_id: &str,
        cursor: Option<&PaginationCursor>,
    ) -> Result<RecordPage, ProviderError> {
        self.cursors_seen.lock().push((zone_id.to_string(), cursor.cloned()));
        tokio::task::yield_now().await;
        if self.failing_zones.contains(zone_id) {
            return Err(ProviderError::new("ListResourceRecordSets", "NoSuchHostedZone"));
        }
        if self.panicking_zones.contains(zone_id) {
            panic!("record listing blew up for {zone_id}");
        }
        let all = self.records.get(zone_id).cloned().unwrap_or_default();
        let start = match cursor {
            None => 0,
            Some(c) => {
                let wanted = cursor_key(c);
                all.iter().position(|r| key(r) >= wanted).unwrap_or(all.len())
            }
        };
        let end = (start + self.page_size).min(all.len());
        let is_truncated = end < all.len();
        let next = all.get(end).filter(|_| is_truncated).map(|r| PaginationCursor {
            next_name: r.name.clone(),
            next_type: r.record_type.clone(),
            next_identifier: r.set_identifier.clone(),
        });
        Ok(RecordPage { record_sets: all[start..end].to_vec(), is_truncated, next })
    }
}

/// Oracle backed by a hostname -> CNAME target table, matched against the
/// fingerprint database. A target declared by the record wins over the
/// table. Records every hostname it is asked about, with its declared target.
#[derive(Default)]
pub struct FakeOracle {
    targets: HashMap<String, String>,
    failing: HashSet<String>,
    panicking: HashSet<String>,
    delay: Option<Duration>,
    pub dispatched: Mutex<Vec<String>>,
    pub declared_targets: Mutex<Vec<(String, Option<String>)>>,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl FakeOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_target(mut self, hostname: &str, target: &str) -> Self {
        self.targets.insert(hostname.to_string(), target.to_string());
        self
    }

    pub fn failing(mut self, hostname: &str) -> Self {
        self.failing.insert(hostname.to_string());
        self
    }

    pub fn panicking(mut self, hostname: &str) -> Self {
        self.panicking.insert(hostname.to_string());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn dispatched(&self) -> Vec<String> {
        let mut d = self.dispatched.lock().clone();
        d.sort();
        d
    }
}

#[async_trait]
impl FingerprintOracle for FakeOracle {
    async fn identify(
        &self,
        hostname: &str,
        target: Option<&str>,
        db: &FingerprintDb,
    ) -> Result<Option<String>, OracleError> {
        self.dispatched.lock().push(hostname.to_string());
        self.declared_targets.lock().push((hostname.to_string(), target.map(str::to_string)));
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        match self.delay {
            Some(d) => tokio::time::sleep(d).await,
            None => tokio::task::yield_now().await,
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.panicking.contains(hostname) {
            panic!("lookup blew up for {hostname}");
        }
        if self.failing.contains(hostname) {
            return Err(OracleError::Resolve { host: hostname.to_string(), message: "SERVFAIL".into() });
        }
        Ok(target
            .or_else(|| self.targets.get(hostname).map(String::as_str))
            .and_then(|target| db.match_target(target))
            .map(|s| s.service.clone()))
    }
}

pub fn heroku_db() -> Arc<FingerprintDb> {
    Arc::new(FingerprintDb::new(vec![
        FingerprintSignature {
            service: "Heroku".into(),
            cname: vec!["herokudns.com".into(), "herokuapp.com".into()],
            fingerprint: vec!["No such app".into()],
            nxdomain: false,
        },
        FingerprintSignature {
            service: "github".into(),
            cname: vec!["github.io".into()],
            fingerprint: vec!["There isn't a GitHub Pages site here.".into()],
            nxdomain: false,
        },
    ]))
}
