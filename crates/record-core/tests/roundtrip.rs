//! End-to-end translation tests over a realistic record shape.

use chrono::{DateTime, TimeZone, Utc};
use record_core::{
    fields_and_values, from_mapping, from_mapping_with, to_mapping, DecodePolicy, FieldKind,
    FieldSpec, Mapping, MappingError, Record, Value,
};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use uuid::Uuid;

/// Payload type outside the native set; stored as JSON text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct Credits {
    producer: String,
    samples: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
struct Track {
    id: Uuid,
    title: String,
    plays: i64,
    rating: f64,
    released: DateTime<Utc>,
    artwork: Vec<u8>,
    tags: Vec<String>,
    scores: Vec<i32>,
    credits: Credits,
}

impl Default for Track {
    fn default() -> Self {
        Self {
            id: Uuid::nil(),
            title: String::new(),
            plays: 0,
            rating: 0.0,
            released: DateTime::UNIX_EPOCH,
            artwork: Vec::new(),
            tags: Vec::new(),
            scores: Vec::new(),
            credits: Credits::default(),
        }
    }
}

impl Record for Track {
    fn shape() -> &'static [FieldSpec] {
        static SHAPE: LazyLock<Vec<FieldSpec>> = LazyLock::new(|| {
            vec![
                FieldSpec {
                    name: "Id",
                    column: Some("id"),
                    kind: FieldKind::Uuid,
                },
                FieldSpec {
                    name: "Title",
                    column: Some("title"),
                    kind: FieldKind::Varchar,
                },
                FieldSpec {
                    name: "Plays",
                    column: Some("plays"),
                    kind: FieldKind::BigInt,
                },
                FieldSpec {
                    name: "Rating",
                    column: Some("rating"),
                    kind: FieldKind::Double,
                },
                FieldSpec {
                    name: "Released",
                    column: Some("released"),
                    kind: FieldKind::Timestamp,
                },
                FieldSpec {
                    name: "Artwork",
                    column: Some("artwork"),
                    kind: FieldKind::Blob,
                },
                FieldSpec {
                    name: "Tags",
                    column: Some("tags"),
                    kind: FieldKind::List(Box::new(FieldKind::Varchar)),
                },
                FieldSpec {
                    name: "Scores",
                    column: Some("scores"),
                    kind: FieldKind::List(Box::new(FieldKind::Int)),
                },
                FieldSpec {
                    name: "Credits",
                    column: Some("credits"),
                    kind: FieldKind::Custom,
                },
            ]
        });
        SHAPE.as_slice()
    }

    fn get(&self, ordinal: usize) -> Value {
        match ordinal {
            0 => Value::Uuid(self.id),
            1 => Value::Varchar(self.title.clone()),
            2 => Value::BigInt(self.plays),
            3 => Value::Double(self.rating),
            4 => Value::Timestamp(self.released),
            5 => Value::Blob(self.artwork.clone()),
            6 => Value::List(
                self.tags
                    .iter()
                    .cloned()
                    .map(Value::Varchar)
                    .collect(),
            ),
            7 => Value::List(self.scores.iter().copied().map(Value::Int).collect()),
            8 => Value::custom(&self.credits).unwrap_or(Value::Null),
            _ => Value::Null,
        }
    }

    fn set(&mut self, ordinal: usize, value: Value) -> Result<(), MappingError> {
        match (ordinal, value) {
            (_, Value::Null) => {}
            (0, Value::Uuid(id)) => self.id = id,
            (1, Value::Varchar(title)) => self.title = title,
            (2, Value::BigInt(plays)) => self.plays = plays,
            (3, Value::Double(rating)) => self.rating = rating,
            (4, Value::Timestamp(released)) => self.released = released,
            (5, Value::Blob(artwork)) => self.artwork = artwork,
            (6, Value::List(items)) => {
                self.tags = items
                    .iter()
                    .filter_map(|item| item.as_str().map(str::to_string))
                    .collect();
            }
            (7, Value::List(items)) => {
                self.scores = items.iter().filter_map(Value::as_i32).collect();
            }
            (8, value @ Value::Custom(_)) => self.credits = value.decode()?,
            (ordinal, _) => {
                return Err(MappingError::UnknownOrdinal {
                    record: "Track",
                    ordinal,
                })
            }
        }
        Ok(())
    }
}

fn sample_track() -> Track {
    Track {
        id: Uuid::new_v4(),
        title: "Paranoid Android".to_string(),
        plays: 1_000_000,
        rating: 4.5,
        released: Utc.with_ymd_and_hms(1997, 5, 26, 0, 0, 0).unwrap(),
        artwork: vec![0xde, 0xad, 0xbe, 0xef],
        tags: vec!["rock".to_string(), "90s".to_string()],
        scores: vec![10, 9, 10],
        credits: Credits {
            producer: "Nigel Godrich".to_string(),
            samples: vec!["none".to_string()],
        },
    }
}

#[test]
fn round_trip_reproduces_all_fields() {
    let track = sample_track();
    let mapping = to_mapping(&track);

    let mut restored = Track::default();
    from_mapping(&mapping, &mut restored).unwrap();
    assert_eq!(restored, track);
}

#[test]
fn mapping_uses_exposed_keys() {
    let track = sample_track();
    let mapping = to_mapping(&track);
    assert_eq!(mapping.len(), 9);
    assert_eq!(mapping["title"], Value::Varchar(track.title.clone()));
    assert_eq!(mapping["plays"], Value::BigInt(track.plays));
    assert!(mapping.contains_key("credits"));
}

#[test]
fn keys_match_case_insensitively() {
    let mut mapping = Mapping::new();
    mapping.insert("TITLE".to_string(), Value::Varchar("Karma Police".into()));

    let mut track = Track::default();
    from_mapping(&mapping, &mut track).unwrap();
    assert_eq!(track.title, "Karma Police");
}

#[test]
fn unknown_keys_are_ignored() {
    let mut mapping = Mapping::new();
    mapping.insert("nonexistent".to_string(), Value::Int(1));

    let mut track = Track::default();
    from_mapping(&mapping, &mut track).unwrap();
    assert_eq!(track, Track::default());
}

#[test]
fn fields_and_values_follow_declaration_order() {
    let track = sample_track();
    let (keys, values) = fields_and_values(&track);
    assert_eq!(
        keys,
        vec![
            "id", "title", "plays", "rating", "released", "artwork", "tags", "scores", "credits"
        ]
    );
    assert_eq!(values.len(), keys.len());
    assert_eq!(values[0], Value::Uuid(track.id));
    assert_eq!(values[2], Value::BigInt(track.plays));
}

#[test]
fn numeric_family_conversions_apply() {
    let mut mapping = Mapping::new();
    // int into a bigint field, bigints into an int-list field
    mapping.insert("plays".to_string(), Value::Int(3));
    mapping.insert(
        "scores".to_string(),
        Value::List(vec![Value::BigInt(5), Value::BigInt(7)]),
    );

    let mut track = Track::default();
    from_mapping(&mapping, &mut track).unwrap();
    assert_eq!(track.plays, 3);
    assert_eq!(track.scores, vec![5, 7]);
}

#[test]
fn partial_slice_decode_drops_bad_elements() {
    let mut mapping = Mapping::new();
    mapping.insert(
        "scores".to_string(),
        Value::List(vec![
            Value::Varchar("1".to_string()),
            Value::Varchar("not-json".to_string()),
            Value::Varchar("2".to_string()),
        ]),
    );

    let mut track = Track::default();
    from_mapping(&mapping, &mut track).unwrap();
    // Successfully decoded elements survive in source order; failures drop.
    assert_eq!(track.scores, vec![1, 2]);
}

#[test]
fn strict_policy_aborts_on_bad_element() {
    let mut mapping = Mapping::new();
    mapping.insert(
        "scores".to_string(),
        Value::List(vec![
            Value::Varchar("1".to_string()),
            Value::Varchar("not-json".to_string()),
        ]),
    );

    let mut track = Track::default();
    let err = from_mapping_with(&mapping, &mut track, DecodePolicy::Strict).unwrap_err();
    assert!(matches!(
        err,
        MappingError::ElementDecode { index: 1, .. }
    ));
}

#[test]
fn unhandled_type_pair_is_an_error() {
    let mut mapping = Mapping::new();
    mapping.insert("plays".to_string(), Value::Boolean(true));

    let mut track = Track::default();
    let err = from_mapping(&mapping, &mut track).unwrap_err();
    match err {
        MappingError::TypeMismatch {
            field,
            expected,
            actual,
        } => {
            assert_eq!(field, "plays");
            assert_eq!(expected, FieldKind::BigInt);
            assert_eq!(actual, FieldKind::Boolean);
        }
        other => panic!("expected TypeMismatch, got {other:?}"),
    }
}

#[test]
fn null_leaves_field_untouched() {
    let mut mapping = Mapping::new();
    mapping.insert("title".to_string(), Value::Null);

    let mut track = sample_track();
    let title = track.title.clone();
    from_mapping(&mapping, &mut track).unwrap();
    assert_eq!(track.title, title);
}
