//! Trigram table, composition and line-change properties over the public API

use std::collections::HashSet;

use gua_engine::{Cast, Hexagram, HexagramError, Trigram, apply_moving_line};

fn every_hexagram() -> Vec<Hexagram> {
    (1..=8)
        .flat_map(|upper| (1..=8).map(move |lower| Hexagram::compose(upper, lower).unwrap()))
        .collect()
}

#[test]
fn trigram_patterns_are_a_bijection() {
    let patterns: HashSet<[u8; 3]> = (1..=8)
        .map(|id| Trigram::lookup(id).unwrap().bits())
        .collect();
    assert_eq!(patterns.len(), 8);

    for pattern in &patterns {
        assert!(pattern.iter().all(|bit| *bit <= 1));
    }
}

#[test]
fn composition_stacks_lower_under_upper() {
    for hexagram in every_hexagram() {
        let mut expected = hexagram.lower().bits().to_vec();
        expected.extend(hexagram.upper().bits());
        assert_eq!(hexagram.bits().to_vec(), expected, "{hexagram}");
    }
}

#[test]
fn sixty_four_distinct_names_and_numbers() {
    let hexagrams = every_hexagram();
    let names: HashSet<&str> = hexagrams.iter().map(Hexagram::name).collect();
    let numbers: HashSet<u8> = hexagrams.iter().map(Hexagram::number).collect();
    assert_eq!(names.len(), 64);
    assert_eq!(numbers, (1..=64).collect());
}

#[test]
fn moving_the_same_line_twice_round_trips() {
    for hexagram in every_hexagram() {
        for line in 1..=6 {
            let changed = apply_moving_line(&hexagram, line).unwrap();
            assert_ne!(changed, hexagram);
            assert_eq!(apply_moving_line(&changed, line).unwrap(), hexagram);
        }
    }
}

#[test]
fn out_of_range_inputs_fail_locally() {
    let qian = Hexagram::compose(1, 1).unwrap();
    assert_eq!(
        apply_moving_line(&qian, 0),
        Err(HexagramError::InvalidLineIndex(0))
    );
    assert_eq!(
        apply_moving_line(&qian, 7),
        Err(HexagramError::InvalidLineIndex(7))
    );
    assert_eq!(
        Hexagram::compose(9, 1),
        Err(HexagramError::InvalidTrigramId(9))
    );
    assert_eq!(
        Hexagram::compose(1, 0),
        Err(HexagramError::InvalidTrigramId(0))
    );
}

#[test]
fn heaven_over_earth_first_line_becomes_wuwang() {
    let cast = Cast::new(1, 8, 1).unwrap();
    assert_eq!(cast.original.bits(), [0, 0, 0, 1, 1, 1]);
    assert_eq!(cast.changed.bits(), [1, 0, 0, 1, 1, 1]);
    assert_eq!(cast.changed.lower().bits(), [1, 0, 0]);
    assert_eq!(cast.changed.upper().bits(), [1, 1, 1]);
    assert_ne!(cast.changed.lower().id, cast.changed.upper().id);
    assert_eq!(cast.original.name(), "天地否");
    assert_eq!(cast.changed.name(), "天雷无妄");
}

#[test]
fn cast_serializes_lines_as_bits() {
    let value = serde_json::to_value(Cast::new(1, 8, 1).unwrap()).unwrap();
    assert_eq!(value["movingLine"], 1);
    assert_eq!(value["changed"]["lines"], serde_json::json!([1, 0, 0, 1, 1, 1]));
}
