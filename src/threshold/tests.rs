// Integration tests for threshold lookup and classification

use super::*;
use crate::prepare::Sample;
use crate::survey::{Category, ExceptionKind, Level, TrackType};

/// TML-style table: several zones, KSL curve and SCL without an L2 band
const TML_TABLE: &str = r#"
[[threshold]]
class = "both"
exception = "wire_wear"
tier = "L1"
max = 9.5

[[threshold]]
class = "both"
exception = "wire_wear"
tier = "L2"
max = 10.2

[[threshold]]
class = "SCL"
exception = "wire_wear"
tier = "L1"
max = 9.0

[[threshold]]
class = "SCL"
exception = "wire_wear"
tier = "L2"
max = 9.8

[[threshold]]
class = "both"
track_type = "tangent"
exception = "stagger"
tier = "L1"
min = 300.0

[[threshold]]
class = "both"
track_type = "tangent"
exception = "stagger"
tier = "L2"
min = 250.0
max = 300.0

[[threshold]]
class = "both"
track_type = "tangent"
exception = "stagger"
tier = "L3"
min = 220.0

[[threshold]]
class = "both"
track_type = "curve"
exception = "stagger"
tier = "L1"
min = 350.0

[[threshold]]
class = "both"
track_type = "curve"
exception = "stagger"
tier = "L2"
min = 300.0
max = 350.0

[[threshold]]
class = "both"
track_type = "curve"
exception = "stagger"
tier = "L3"
min = 270.0

[[threshold]]
class = "KSL"
track_type = "tangent"
exception = "stagger"
tier = "L2"
min = 240.0
max = 280.0

[[threshold]]
class = "KSL"
track_type = "curve"
exception = "stagger"
tier = "L2"

[[threshold]]
class = "SCL"
exception = "stagger"
tier = "L2"
"#;

fn table() -> ThresholdSet {
    ThresholdSet::from_toml_str(TML_TABLE).unwrap()
}

fn sample(value: f64, zone: Option<&str>, track_type: TrackType) -> Sample {
    Sample {
        location: 12.345,
        value,
        zone: zone.map(str::to_string),
        track_type,
    }
}

#[test]
fn test_example_table_parses() {
    let content = include_str!("../../thresholds.example.toml");
    let set = ThresholdSet::from_toml_str(content).unwrap();
    assert!(!set.is_empty());

    let scope = Scope {
        zone: Some("SCL"),
        section: "TUM-HUH",
        track_type: TrackType::Curve,
    };
    assert_eq!(
        set.lookup(ExceptionKind::Stagger, Level::L2, &scope),
        Lookup::NotApplied
    );
}

#[test]
fn test_zone_specific_bound_overrides_default() {
    let set = table();
    let classifier = Classifier::new(&set, "TUM-HUH", Category::WireWear);

    // 10.0 is an L2 on plain track but clear of the tighter SCL L2 bound
    let plain = sample(10.0, None, TrackType::Tangent);
    let scl = sample(10.0, Some("SCL"), TrackType::Tangent);
    assert!(classifier.detects(&plain).unwrap());
    assert!(!classifier.detects(&scl).unwrap());

    // 9.2 is L1 on plain track, only L2 inside SCL
    let plain = classifier.classify(&sample(9.2, None, TrackType::Tangent)).unwrap();
    let scl = classifier.classify(&sample(9.2, Some("SCL"), TrackType::Tangent)).unwrap();
    assert_eq!(plain.severity(Category::WireWear), Level::L1);
    assert_eq!(scl.severity(Category::WireWear), Level::L2);
}

#[test]
fn test_unknown_zone_falls_back_to_default() {
    let set = table();
    let scope = Scope {
        zone: Some("WRL"),
        section: "TUM-HUH",
        track_type: TrackType::Tangent,
    };
    assert_eq!(
        set.lookup(ExceptionKind::WireWear, Level::L2, &scope),
        Lookup::Applies(Bound {
            min: None,
            max: Some(10.2)
        })
    );
}

#[test]
fn test_blank_entry_blocks_fallback() {
    let set = table();
    let curve = Scope {
        zone: Some("KSL"),
        section: "TUM-HUH",
        track_type: TrackType::Curve,
    };
    let tangent = Scope {
        track_type: TrackType::Tangent,
        ..curve
    };
    assert_eq!(
        set.lookup(ExceptionKind::Stagger, Level::L2, &curve),
        Lookup::NotApplied
    );
    assert_eq!(
        set.lookup(ExceptionKind::Stagger, Level::L2, &tangent),
        Lookup::Applies(Bound {
            min: Some(240.0),
            max: Some(280.0)
        })
    );
}

#[test]
fn test_missing_entry_is_an_error() {
    let set = table();
    let classifier = Classifier::new(&set, "TUM-HUH", Category::LowHeight);
    let err = classifier
        .detects(&sample(5000.0, Some("MOL"), TrackType::Tangent))
        .unwrap_err();
    assert!(err.to_string().contains("LowHeight"));
    assert!(err.to_string().contains("MOL"));
}

#[test]
fn test_stagger_grades() {
    let set = table();
    let left = Classifier::new(&set, "TUM-HUH", Category::StaggerLeft);
    let grade = |value: f64, zone: Option<&str>, track: TrackType| {
        left.classify(&sample(value, zone, track))
            .unwrap()
            .severity(Category::StaggerLeft)
    };

    assert_eq!(grade(230.0, None, TrackType::Tangent), Level::L3);
    assert_eq!(grade(250.0, None, TrackType::Tangent), Level::L2);
    assert_eq!(grade(299.9, None, TrackType::Tangent), Level::L2);
    assert_eq!(grade(300.0, None, TrackType::Tangent), Level::L1);

    // KSL curve has no L2 band: falls straight from L1 to L3
    assert_eq!(grade(320.0, Some("KSL"), TrackType::Curve), Level::L3);
    assert_eq!(grade(320.0, None, TrackType::Curve), Level::L2);
}

#[test]
fn test_right_stagger_uses_magnitude() {
    let set = table();
    let right = Classifier::new(&set, "TUM-HUH", Category::StaggerRight);

    assert!(right.detects(&sample(-225.0, None, TrackType::Tangent)).unwrap());
    assert!(!right.detects(&sample(-215.0, None, TrackType::Tangent)).unwrap());
    assert!(!right.detects(&sample(225.0, None, TrackType::Tangent)).unwrap());

    let flags = right.classify(&sample(-260.0, None, TrackType::Tangent)).unwrap();
    assert!(flags.get(Level::L3));
    assert!(flags.get(Level::L2));
    assert!(!flags.get(Level::L1));
    assert_eq!(flags.severity(Category::StaggerRight), Level::L2);
}

#[test]
fn test_duplicate_entries_rejected() {
    let doubled = format!(
        "{TML_TABLE}\n[[threshold]]\nclass = \"SCL\"\nexception = \"wire_wear\"\ntier = \"L1\"\nmax = 8.0\n"
    );
    assert!(ThresholdSet::from_toml_str(&doubled).is_err());
}

#[test]
fn test_wrong_bound_shape_rejected() {
    let entry = ThresholdEntry {
        class: "both".to_string(),
        track_type: None,
        exception: ExceptionKind::HighHeight,
        tier: Level::L2,
        min: None,
        max: Some(5700.0),
    };
    assert!(ThresholdSet::from_entries(vec![entry]).is_err());

    let inverted = ThresholdEntry {
        class: "both".to_string(),
        track_type: Some(TrackType::Curve),
        exception: ExceptionKind::Stagger,
        tier: Level::L2,
        min: Some(350.0),
        max: Some(300.0),
    };
    assert!(ThresholdSet::from_entries(vec![inverted]).is_err());
}

#[test]
fn test_breach_predicates_are_inclusive() {
    let max_only = Bound {
        min: None,
        max: Some(10.2),
    };
    assert!(breaches(Category::WireWear, Level::L2, &max_only, 10.2));
    assert!(!breaches(Category::WireWear, Level::L2, &max_only, 10.21));

    let min_only = Bound {
        min: Some(5650.0),
        max: None,
    };
    assert!(breaches(Category::HighHeight, Level::L2, &min_only, 5650.0));
    assert!(!breaches(Category::HighHeight, Level::L2, &min_only, 5649.9));
}
