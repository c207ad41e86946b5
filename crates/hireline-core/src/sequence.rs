//! Sequenced collections and reorder batch normalization.
//!
//! Admin screens reorder lists by sending a batch of `{id, sequence}` pairs.
//! Clients are loose about types (ids arrive as numbers or strings, a cleared
//! position arrives as `""`), so the wire shape is kept permissive here and
//! narrowed into [`SequenceAssignment`]s before anything touches the database.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::RecordId;

/// A table whose rows carry a nullable integer `sequence` column used for display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SequencedCollection {
    Plans,
    PlanBenefits,
    Skills,
    Qualifications,
    Shifts,
    Experiences,
    Locations,
}

impl SequencedCollection {
    pub const ALL: [SequencedCollection; 7] = [
        SequencedCollection::Plans,
        SequencedCollection::PlanBenefits,
        SequencedCollection::Skills,
        SequencedCollection::Qualifications,
        SequencedCollection::Shifts,
        SequencedCollection::Experiences,
        SequencedCollection::Locations,
    ];

    /// Backing table. These are the only identifiers ever interpolated into SQL.
    pub fn table(&self) -> &'static str {
        match self {
            SequencedCollection::Plans => "subscription_plans",
            SequencedCollection::PlanBenefits => "plan_benefits",
            SequencedCollection::Skills => "skills",
            SequencedCollection::Qualifications => "qualifications",
            SequencedCollection::Shifts => "shifts",
            SequencedCollection::Experiences => "experiences",
            SequencedCollection::Locations => "locations",
        }
    }

    /// URL path segment the collection is served under.
    pub fn resource(&self) -> &'static str {
        match self {
            SequencedCollection::Plans => "plans",
            SequencedCollection::PlanBenefits => "benefits",
            SequencedCollection::Skills => "skills",
            SequencedCollection::Qualifications => "qualifications",
            SequencedCollection::Shifts => "shifts",
            SequencedCollection::Experiences => "experiences",
            SequencedCollection::Locations => "locations",
        }
    }

    /// JSON key holding the batch in a `PUT /{resource}/sequence` body.
    pub fn entries_field(&self) -> &'static str {
        self.resource()
    }

    /// Look up a collection by its URL segment.
    pub fn from_resource(resource: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.resource() == resource)
    }
}

/// Reference data tables sharing the `(id, name, is_active, sequence)` shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    Skills,
    Qualifications,
    Shifts,
    Experiences,
    Locations,
}

impl ReferenceKind {
    pub const ALL: [ReferenceKind; 5] = [
        ReferenceKind::Skills,
        ReferenceKind::Qualifications,
        ReferenceKind::Shifts,
        ReferenceKind::Experiences,
        ReferenceKind::Locations,
    ];

    pub fn collection(&self) -> SequencedCollection {
        match self {
            ReferenceKind::Skills => SequencedCollection::Skills,
            ReferenceKind::Qualifications => SequencedCollection::Qualifications,
            ReferenceKind::Shifts => SequencedCollection::Shifts,
            ReferenceKind::Experiences => SequencedCollection::Experiences,
            ReferenceKind::Locations => SequencedCollection::Locations,
        }
    }

    pub fn table(&self) -> &'static str {
        self.collection().table()
    }

    pub fn resource(&self) -> &'static str {
        self.collection().resource()
    }
}

impl From<ReferenceKind> for SequencedCollection {
    fn from(kind: ReferenceKind) -> Self {
        kind.collection()
    }
}

/// A field value as a JSON client may send it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntryValue {
    Number(serde_json::Number),
    Text(String),
    Other(serde_json::Value),
}

impl From<i64> for EntryValue {
    fn from(n: i64) -> Self {
        EntryValue::Number(n.into())
    }
}

impl From<&str> for EntryValue {
    fn from(s: &str) -> Self {
        EntryValue::Text(s.to_string())
    }
}

/// One element of a reorder request before normalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSequenceEntry {
    #[serde(default)]
    pub id: Option<EntryValue>,
    #[serde(default)]
    pub sequence: Option<EntryValue>,
}

impl RawSequenceEntry {
    pub fn new(id: impl Into<EntryValue>, sequence: Option<EntryValue>) -> Self {
        Self {
            id: Some(id.into()),
            sequence,
        }
    }
}

/// A normalized `(id, sequence)` pair ready to be persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceAssignment {
    pub id: RecordId,
    pub sequence: Option<i32>,
}

/// Coerce a client-supplied id into a record key.
pub fn coerce_id(value: &EntryValue) -> Option<RecordId> {
    match value {
        EntryValue::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().and_then(integral_i64))
            .map(RecordId::new),
        EntryValue::Text(s) => s.trim().parse::<i64>().ok().map(RecordId::new),
        EntryValue::Other(_) => None,
    }
}

/// Coerce a client-supplied sequence. Anything unusable degrades to `None`.
pub fn coerce_sequence(value: Option<&EntryValue>) -> Option<i32> {
    let wide = match value? {
        EntryValue::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(integral_i64)),
        EntryValue::Text(s) => {
            let s = s.trim();
            if s.is_empty() {
                return None;
            }
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(integral_i64))
        }
        EntryValue::Other(_) => None,
    };
    wide.and_then(|n| i32::try_from(n).ok())
}

fn integral_i64(f: f64) -> Option<i64> {
    if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

/// Normalize a raw batch.
///
/// Entries without a usable id are dropped. When an id appears more than once
/// only its last occurrence survives, so the persisted outcome never depends on
/// statement ordering.
pub fn normalize_entries(entries: Vec<RawSequenceEntry>) -> Vec<SequenceAssignment> {
    let mut seen = HashSet::new();
    let mut batch: Vec<SequenceAssignment> = entries
        .iter()
        .rev()
        .filter_map(|entry| {
            let id = entry.id.as_ref().and_then(coerce_id)?;
            if !seen.insert(id) {
                return None;
            }
            Some(SequenceAssignment {
                id,
                sequence: coerce_sequence(entry.sequence.as_ref()),
            })
        })
        .collect();
    batch.reverse();
    batch
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> Vec<RawSequenceEntry> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_drops_malformed_ids() {
        let batch = normalize_entries(parse(json!([
            { "id": "abc", "sequence": 1 },
            { "id": 5, "sequence": 2 }
        ])));

        assert_eq!(
            batch,
            vec![SequenceAssignment {
                id: RecordId::new(5),
                sequence: Some(2)
            }]
        );
    }

    #[test]
    fn test_missing_and_null_ids_are_dropped() {
        let batch = normalize_entries(parse(json!([
            { "sequence": 1 },
            { "id": null, "sequence": 2 },
            { "id": true, "sequence": 3 },
            { "id": 1.5, "sequence": 4 }
        ])));
        assert!(batch.is_empty());
    }

    #[test]
    fn test_string_ids_are_coerced() {
        let batch = normalize_entries(parse(json!([
            { "id": " 7 ", "sequence": "3" },
            { "id": 8.0, "sequence": 4.0 }
        ])));

        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].id, RecordId::new(7));
        assert_eq!(batch[0].sequence, Some(3));
        assert_eq!(batch[1].id, RecordId::new(8));
        assert_eq!(batch[1].sequence, Some(4));
    }

    #[test]
    fn test_empty_string_clears_sequence() {
        let batch = normalize_entries(parse(json!([{ "id": 5, "sequence": "" }])));
        assert_eq!(batch[0].sequence, None);
    }

    #[test]
    fn test_malformed_sequence_degrades_to_none() {
        let batch = normalize_entries(parse(json!([
            { "id": 1, "sequence": "first" },
            { "id": 2, "sequence": 2.5 },
            { "id": 3, "sequence": { "at": 1 } },
            { "id": 4, "sequence": 99999999999i64 },
            { "id": 5 },
            { "id": 6, "sequence": null }
        ])));

        assert_eq!(batch.len(), 6);
        assert!(batch.iter().all(|a| a.sequence.is_none()));
    }

    #[test]
    fn test_duplicate_ids_keep_last_occurrence() {
        let batch = normalize_entries(parse(json!([
            { "id": 1, "sequence": 10 },
            { "id": 2, "sequence": 20 },
            { "id": "1", "sequence": 30 },
            { "id": 3, "sequence": 40 }
        ])));

        let pairs: Vec<(i64, Option<i32>)> =
            batch.iter().map(|a| (a.id.get(), a.sequence)).collect();
        assert_eq!(pairs, vec![(2, Some(20)), (1, Some(30)), (3, Some(40))]);
    }

    #[test]
    fn test_extra_fields_are_ignored() {
        let entries = parse(json!([{ "id": 4, "sequence": 1, "name": "Gold" }]));
        assert_eq!(normalize_entries(entries).len(), 1);
    }

    #[test]
    fn test_collection_lookup_by_resource() {
        for collection in SequencedCollection::ALL {
            assert_eq!(
                SequencedCollection::from_resource(collection.resource()),
                Some(collection)
            );
        }
        assert_eq!(SequencedCollection::from_resource("jobs"), None);
        assert_eq!(SequencedCollection::PlanBenefits.entries_field(), "benefits");
        assert_eq!(ReferenceKind::Shifts.table(), "shifts");
    }
}
