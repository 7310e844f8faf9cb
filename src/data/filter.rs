use super::geometry::CoercionPolicy;
use super::model::{GeoRecord, GeoRecordSet};

// ---------------------------------------------------------------------------
// Filter predicate: which status value selects a record
// ---------------------------------------------------------------------------

/// Which records to keep and how to normalise them on the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LotQuery {
    /// Attribute column holding the occupancy classification.
    pub status_column: String,
    /// Value a record's status must equal to be kept.
    pub status_value: String,
    pub coercion: CoercionPolicy,
}

impl Default for LotQuery {
    fn default() -> Self {
        Self {
            status_column: "status".to_string(),
            status_value: "empty".to_string(),
            coercion: CoercionPolicy::default(),
        }
    }
}

impl LotQuery {
    /// A record matches only when its status is a string equal to the
    /// requested value. Missing, null and non-string statuses never match.
    pub fn matches(&self, record: &GeoRecord) -> bool {
        record.attribute(&self.status_column).as_str() == Some(self.status_value.as_str())
    }
}

/// Return the records that pass `query`, in their original order, as a new
/// set with the same column layout.
pub fn filter_by_status(set: &GeoRecordSet, query: &LotQuery) -> GeoRecordSet {
    let kept: Vec<GeoRecord> = set
        .iter()
        .filter(|record| query.matches(record))
        .cloned()
        .collect();
    set.with_records(kept)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::data::model::AttributeValue;

    fn record(parcel: i64, status: AttributeValue) -> GeoRecord {
        let mut attributes = BTreeMap::new();
        attributes.insert("parcel".to_string(), AttributeValue::Integer(parcel));
        attributes.insert("status".to_string(), status);
        GeoRecord::new(None, attributes)
    }

    fn text(s: &str) -> AttributeValue {
        AttributeValue::String(s.to_string())
    }

    fn dataset() -> GeoRecordSet {
        GeoRecordSet::new(
            vec![
                record(1, text("empty")),
                record(2, text("occupied")),
                record(3, text("empty")),
                record(4, AttributeValue::Null),
                record(5, text("Empty")),
            ],
            vec!["parcel".to_string(), "status".to_string()],
            true,
        )
    }

    fn parcels(set: &GeoRecordSet) -> Vec<i64> {
        set.iter()
            .filter_map(|r| match r.attribute("parcel") {
                AttributeValue::Integer(i) => Some(*i),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_keeps_only_matching_in_order() {
        let out = filter_by_status(&dataset(), &LotQuery::default());
        assert_eq!(parcels(&out), vec![1, 3]);
        assert_eq!(out.column_names(), dataset().column_names());
    }

    #[test]
    fn test_custom_status_value() {
        let query = LotQuery {
            status_value: "occupied".to_string(),
            ..LotQuery::default()
        };
        assert_eq!(parcels(&filter_by_status(&dataset(), &query)), vec![2]);
    }

    #[test]
    fn test_non_string_status_never_matches() {
        let set = GeoRecordSet::new(
            vec![record(1, AttributeValue::Integer(0)), record(2, text("0"))],
            vec!["parcel".to_string(), "status".to_string()],
            true,
        );
        let query = LotQuery {
            status_value: "0".to_string(),
            ..LotQuery::default()
        };
        assert_eq!(parcels(&filter_by_status(&set, &query)), vec![2]);
    }

    #[test]
    fn test_no_match_gives_empty_set() {
        let query = LotQuery {
            status_value: "demolished".to_string(),
            ..LotQuery::default()
        };
        let out = filter_by_status(&dataset(), &query);
        assert!(out.is_empty());
        assert!(out.has_column("status"));
    }
}
