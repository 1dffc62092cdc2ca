//! Route 53 backed [`ZoneProvider`].

use async_trait::async_trait;
use aws_sdk_route53::error::DisplayErrorContext;
use aws_sdk_route53::types::RrType;
use std::time::Duration;
use tracing::{debug, info};

use super::{HostedZone, PaginationCursor, RecordPage, RecordSet, RecordType, ZonePage, ZoneProvider};
use crate::errors::ProviderError;

/// Route 53 is a global service; the SDK signs against us-east-1 unless told otherwise.
const DEFAULT_REGION: &str = "us-east-1";

pub struct Route53Provider {
    client: aws_sdk_route53::Client,
}

impl Route53Provider {
    /// Build a client for the named profile from the shared AWS config/credentials files.
    ///
    /// `api_timeout` bounds each Route 53 operation, retries included.
    pub async fn connect(profile: &str, region: Option<&str>, api_timeout: Duration) -> Self {
        info!(profile = %profile, "Loading AWS configuration");

        let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .profile_name(profile)
            .region(aws_config::Region::new(region.unwrap_or(DEFAULT_REGION).to_string()))
            .timeout_config(
                aws_config::timeout::TimeoutConfig::builder()
                    .operation_timeout(api_timeout)
                    .build(),
            )
            .load()
            .await;

        Self { client: aws_sdk_route53::Client::new(&config) }
    }
}

fn record_type(t: &RrType) -> RecordType {
    RecordType::from(t.as_str())
}

#[async_trait]
impl ZoneProvider for Route53Provider {
    async fn list_zones_page(&self, marker: Option<String>) -> Result<ZonePage, ProviderError> {
        let response = self
            .client
            .list_hosted_zones()
            .set_marker(marker)
            .send()
            .await
            .map_err(|e| ProviderError::new("ListHostedZones", DisplayErrorContext(&e).to_string()))?;

        let zones = response
            .hosted_zones()
            .iter()
            .map(|z| HostedZone {
                id: z.id().to_string(),
                name: z.name().to_string(),
                is_private: z.config().map(|c| c.private_zone()).unwrap_or(false),
            })
            .collect();

        let next_marker = match (response.is_truncated(), response.next_marker()) {
            (true, Some(marker)) => Some(marker.to_string()),
            (true, None) => {
                return Err(ProviderError::new("ListHostedZones", "truncated response is missing NextMarker"))
            }
            (false, _) => None,
        };

        Ok(ZonePage { zones, next_marker })
    }

    async fn list_records_page(
        &self,
        zone_id: &str,
        cursor: Option<&PaginationCursor>,
    ) -> Result<RecordPage, ProviderError> {
        let mut request = self.client.list_resource_record_sets().hosted_zone_id(zone_id);
        if let Some(c) = cursor {
            request = request
                .start_record_name(c.next_name.clone())
                .start_record_type(RrType::from(c.next_type.as_str()))
                .set_start_record_identifier(c.next_identifier.clone());
        }

        let response = request.send().await.map_err(|e| {
            ProviderError::new("ListResourceRecordSets", DisplayErrorContext(&e).to_string())
        })?;

        let record_sets: Vec<RecordSet> = response
            .resource_record_sets()
            .iter()
            .map(|rs| RecordSet {
                name: rs.name().to_string(),
                record_type: record_type(rs.r#type()),
                set_identifier: rs.set_identifier().map(str::to_string),
                values: rs.resource_records().iter().map(|r| r.value().to_string()).collect(),
            })
            .collect();

        let is_truncated = response.is_truncated();
        let next = if is_truncated {
            match (response.next_record_name(), response.next_record_type()) {
                (Some(name), Some(t)) => Some(PaginationCursor {
                    next_name: name.to_string(),
                    next_type: record_type(t),
                    next_identifier: response.next_record_identifier().map(str::to_string),
                }),
                _ => {
                    return Err(ProviderError::new(
                        "ListResourceRecordSets",
                        "truncated response is missing NextRecordName/NextRecordType",
                    ))
                }
            }
        } else {
            None
        };

        debug!(zone = %zone_id, count = record_sets.len(), truncated = is_truncated, "record page");
        Ok(RecordPage { record_sets, is_truncated, next })
    }
}
