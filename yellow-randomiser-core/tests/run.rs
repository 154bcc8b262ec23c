use std::fs;

use yellow_randomiser_core::layout::{RomLayout, StatField};
use yellow_randomiser_core::names::TERMINATOR_BYTE;
use yellow_randomiser_core::{run, RandomiserError, RandomiserSettings};

const ROM_SIZE: usize = 0x100000;

const NAME_TABLE: &str = r#"{
 "m": {"a": 3, "e": 1},
 "a": {"r": 2, "\n": 1, "c": 1},
 "e": {"w": 1, "\n": 1},
 "r": {"o": 2, "a": 1},
 "o": {"w": 1, "\n": 2},
 "w": {"\n": 1, "a": 1},
 "c": {"h": 1},
 "h": {"o": 1, "\n": 1}
}"#;

fn fake_rom() -> Vec<u8> {
    (0..ROM_SIZE).map(|i| (i % 251) as u8).collect()
}

fn sorted(mut values: Vec<u8>) -> Vec<u8> {
    values.sort_unstable();
    values
}

fn setup(dir: &std::path::Path, seed: u64) -> RandomiserSettings {
    let input = dir.join("yellow.gbc");
    let names = dir.join("nameMarkov.json");
    fs::write(&input, fake_rom()).unwrap();
    fs::write(&names, NAME_TABLE).unwrap();

    RandomiserSettings {
        seed,
        input_path: input,
        output_path: dir.join("out").join("yellow-random.gbc"),
        name_table_path: names,
        ..RandomiserSettings::default()
    }
}

#[test]
fn writes_a_randomised_copy() {
    let dir = tempfile::tempdir().unwrap();
    let settings = setup(dir.path(), 1234);
    let output_path = settings.output_path.clone();

    let randomised = run(settings).unwrap();
    let source = fake_rom();
    let output = fs::read(&output_path).unwrap();
    assert_eq!(output, randomised.rom);
    assert_eq!(output.len(), source.len());

    let layout = RomLayout::YELLOW;
    for field in [StatField::Hp, StatField::Type2, StatField::Move4] {
        let addresses = layout.stat_addresses(field);
        let before: Vec<u8> = addresses.iter().map(|&a| source[a]).collect();
        let after: Vec<u8> = addresses.iter().map(|&a| output[a]).collect();
        assert_eq!(sorted(before), sorted(after));
    }

    // Catch rates are off by default.
    for a in layout.stat_addresses(StatField::CatchRate) {
        assert_eq!(output[a], source[a]);
    }

    for slot in 0..layout.names.slots {
        let base = layout.names.slot_address(slot);
        let name = &output[base..base + layout.names.width];
        let letters = name
            .iter()
            .position(|&b| b == TERMINATOR_BYTE)
            .unwrap_or(name.len());
        assert!((4..=9).contains(&letters));
    }

    // Nothing past the name bank is touched.
    let end = layout.names.span().end;
    assert_eq!(&output[end..], &source[end..]);
}

#[test]
fn debug_writes_spoiler_log() {
    let dir = tempfile::tempdir().unwrap();
    let settings = RandomiserSettings {
        debug: true,
        stage_aware_evolution_learnsets: true,
        ..setup(dir.path(), 7)
    };
    let spoiler = dir.path().join("out").join("yellow-random.spoiler.json");

    run(settings).unwrap();

    let log: serde_json::Value = serde_json::from_str(&fs::read_to_string(spoiler).unwrap()).unwrap();
    assert_eq!(log["seed"], 7);
    assert_eq!(log["names"].as_array().unwrap().len(), 189);
    let groups = log["groups"].as_array().unwrap();
    let pointers = groups
        .iter()
        .find(|g| g["name"] == "evolution_learnsets")
        .unwrap();
    assert_eq!(pointers["records"], 151);
    assert_eq!(pointers["stage_aware"], true);
}

#[test]
fn missing_input_is_a_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let settings = RandomiserSettings {
        input_path: dir.path().join("nope.gbc"),
        ..RandomiserSettings::default()
    };
    assert!(matches!(run(settings), Err(RandomiserError::Config(_))));
}

#[test]
fn truncated_image_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let settings = setup(dir.path(), 0);
    fs::write(&settings.input_path, vec![0u8; 0x1000]).unwrap();
    let output_path = settings.output_path.clone();

    assert!(matches!(run(settings), Err(RandomiserError::Config(_))));
    assert!(!output_path.exists());
}

#[test]
fn output_aliasing_input_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut settings = setup(dir.path(), 0);
    settings.output_path = dir.path().join(".").join("yellow.gbc");
    let before = fs::read(&settings.input_path).unwrap();
    let input_path = settings.input_path.clone();

    assert!(matches!(run(settings), Err(RandomiserError::Config(_))));
    assert_eq!(fs::read(&input_path).unwrap(), before);
}
