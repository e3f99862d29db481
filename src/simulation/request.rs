use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::{BilledType, ServiceLineItem};

/// A service line as proposed by a caller, before it exists in storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatedServiceLine {
    /// Client-side key, used as id for lines that have none yet.
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub service_line_item_id: Option<String>,
    #[serde(default)]
    pub parent_id: Option<String>,
    pub description: String,
    #[serde(default)]
    pub comments: Option<String>,
    pub billed_type: BilledType,
    pub price: Decimal,
    pub quantity: i64,
    pub service_started: DateTime<Utc>,
    #[serde(default)]
    pub service_ended: Option<DateTime<Utc>>,
    /// VAT rate in percent. Missing means zero.
    #[serde(default)]
    pub vat_rate: Option<Decimal>,
    #[serde(default)]
    pub canceled: bool,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Turn simulated lines into service line items, keeping input order.
///
/// A line without an id takes its key, else a fresh UUID; a line without
/// a parent id starts its own chain. Within a chain, each version ends
/// where the next one (by start time) begins.
pub fn into_service_line_items(lines: Vec<SimulatedServiceLine>) -> Vec<ServiceLineItem> {
    let mut items: Vec<ServiceLineItem> = lines
        .into_iter()
        .map(|line| {
            let id = non_empty(line.service_line_item_id)
                .or_else(|| non_empty(line.key))
                .unwrap_or_else(|| Uuid::new_v4().to_string());
            let parent_id = non_empty(line.parent_id).unwrap_or_else(|| id.clone());
            ServiceLineItem {
                id,
                parent_id,
                name: line.description,
                comments: line.comments,
                billed_type: line.billed_type,
                price: line.price,
                quantity: line.quantity,
                started_at: line.service_started,
                ended_at: line.service_ended,
                vat_rate: line.vat_rate.unwrap_or(Decimal::ZERO),
                canceled: line.canceled,
            }
        })
        .collect();

    let mut chains: HashMap<String, Vec<usize>> = HashMap::new();
    for (i, item) in items.iter().enumerate() {
        chains.entry(item.parent_id.clone()).or_default().push(i);
    }
    for mut chain in chains.into_values() {
        chain.sort_by_key(|&i| items[i].started_at);
        for pair in chain.windows(2) {
            let next_start = items[pair[1]].started_at;
            items[pair[0]].ended_at = Some(next_start);
        }
    }
    items
}
