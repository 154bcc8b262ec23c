use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

pub mod image;
pub mod layout;
pub mod names;
pub mod patch;
pub mod shuffle;
pub mod stages;

use image::build_image;
use layout::{RomLayout, StatField};
use names::{GeneratedName, NameError, NameGenerator, NameTable};
use patch::{BytePatch, PatchGroup};
use shuffle::{shuffle_partitioned, shuffle_records};
use stages::StageTable;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomiserSettings {
    pub seed: u64,
    pub randomize_base_stats: bool,
    pub randomize_types: bool,
    pub randomize_starting_moves: bool,
    pub randomize_catch_rates: bool,
    pub randomize_exp_yields: bool,
    pub randomize_growth_rates: bool,
    pub randomize_palettes: bool,
    pub randomize_evolution_learnsets: bool,
    pub stage_aware_evolution_learnsets: bool,
    pub randomize_names: bool,
    pub name_min_length: usize,
    pub debug: bool,
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub name_table_path: PathBuf,
}

impl Default for RandomiserSettings {
    fn default() -> Self {
        Self {
            seed: 0,
            randomize_base_stats: true,
            randomize_types: true,
            randomize_starting_moves: true,
            // Cheap to shuffle but bad for balance, so off unless asked for.
            randomize_catch_rates: false,
            randomize_exp_yields: false,
            randomize_growth_rates: false,
            randomize_palettes: true,
            randomize_evolution_learnsets: true,
            stage_aware_evolution_learnsets: false,
            randomize_names: true,
            name_min_length: 4,
            debug: false,
            input_path: PathBuf::from("Pokemon - Yellow Version.gbc"),
            output_path: PathBuf::from("output.gbc"),
            name_table_path: PathBuf::from("nameMarkov.json"),
        }
    }
}

impl RandomiserSettings {
    /// Base stat bank fields to shuffle, in the order they are shuffled.
    pub fn stat_fields(&self) -> Vec<StatField> {
        let mut fields = Vec::new();
        if self.randomize_base_stats {
            fields.extend([
                StatField::Hp,
                StatField::Attack,
                StatField::Defense,
                StatField::Speed,
                StatField::Special,
            ]);
        }
        if self.randomize_types {
            fields.extend([StatField::Type1, StatField::Type2]);
        }
        if self.randomize_catch_rates {
            fields.push(StatField::CatchRate);
        }
        if self.randomize_exp_yields {
            fields.push(StatField::ExpYield);
        }
        if self.randomize_growth_rates {
            fields.push(StatField::GrowthRate);
        }
        if self.randomize_starting_moves {
            fields.extend([
                StatField::Move1,
                StatField::Move2,
                StatField::Move3,
                StatField::Move4,
            ]);
        }
        fields
    }
}

#[derive(Debug, Error)]
pub enum RandomiserError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("address 0x{address:06X} is outside the image (length 0x{len:06X})")]
    AddressOutOfBounds { address: usize, len: usize },
    #[error("regions {first} and {second} overlap")]
    RegionOverlap {
        first: &'static str,
        second: &'static str,
    },
    #[error("{labels} partition labels given for {records} records")]
    PartitionMismatch { labels: usize, records: usize },
    #[error("{names} names do not fit in {slots} name slots")]
    NameBankOverflow { names: usize, slots: usize },
    #[error("encoded name is {got} bytes, slot width is {expected}")]
    NameWidth { expected: usize, got: usize },
    #[error("name generation error: {0}")]
    Name(#[from] NameError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RandomiserError>;

/// One shuffled attribute group, as reported in the spoiler log.
#[derive(Debug, Clone, Serialize)]
pub struct GroupSummary {
    pub name: &'static str,
    pub records: usize,
    pub stage_aware: bool,
}

/// Output of a randomisation run.
#[derive(Debug, Clone)]
pub struct Randomised {
    pub rom: Vec<u8>,
    pub groups: Vec<GroupSummary>,
    pub names: Vec<GeneratedName>,
}

#[derive(Serialize)]
struct SpoilerLog<'a> {
    seed: u64,
    settings: &'a RandomiserSettings,
    groups: &'a [GroupSummary],
    names: Vec<String>,
}

/// Randomise an in-memory image.
///
/// `table` is only consulted when name randomisation is on. Every group is
/// shuffled from a single RNG seeded with `settings.seed`, in a fixed order,
/// so the same seed and settings always give the same image.
pub fn randomise_rom(
    rom: &[u8],
    settings: &RandomiserSettings,
    layout: &RomLayout,
    stages: &StageTable,
    table: Option<&NameTable>,
) -> Result<Randomised> {
    layout.validate(rom.len())?;

    let mut rng = StdRng::seed_from_u64(settings.seed);
    let mut patches: Vec<BytePatch> = Vec::new();
    let mut groups: Vec<GroupSummary> = Vec::new();

    let mut push = |group: PatchGroup, stage_aware: bool| {
        debug!(
            group = group.name(),
            records = group.record_count(),
            stage_aware,
            "shuffled group"
        );
        groups.push(GroupSummary {
            name: group.name(),
            records: group.record_count(),
            stage_aware,
        });
        patches.extend(group.patches());
    };

    for field in settings.stat_fields() {
        let group = layout.stat_group(rom, field)?;
        push(shuffle_records(&group, &mut rng), false);
    }

    if settings.randomize_palettes {
        let group = layout.palette_group(rom)?;
        push(shuffle_records(&group, &mut rng), false);
    }

    if settings.randomize_evolution_learnsets {
        let (group, ids) = layout.evolution_learnset_group(rom)?;
        if settings.stage_aware_evolution_learnsets {
            let labels = stages.labels(&ids);
            push(shuffle_partitioned(&group, &labels, &mut rng)?, true);
        } else {
            push(shuffle_records(&group, &mut rng), false);
        }
    }

    let names = if settings.randomize_names {
        let table = table.ok_or_else(|| {
            RandomiserError::Config("name randomisation needs a name table".to_string())
        })?;
        let generator = NameGenerator::new(table, settings.name_min_length, layout.names.width)?;
        (0..layout.names.slots)
            .map(|_| generator.generate(&mut rng))
            .collect::<std::result::Result<Vec<_>, _>>()?
    } else {
        Vec::new()
    };

    info!(
        groups = groups.len(),
        patches = patches.len(),
        names = names.len(),
        "randomised image"
    );

    let rom = build_image(rom, &patches, &names, &layout.names)?;
    Ok(Randomised { rom, groups, names })
}

// The output may not exist yet, so it is resolved through its parent.
fn same_file(input: &Path, output: &Path) -> Result<bool> {
    let input = fs::canonicalize(input)?;
    if output.exists() {
        return Ok(fs::canonicalize(output)? == input);
    }

    let (parent, file_name) = match (output.parent(), output.file_name()) {
        (Some(parent), Some(file_name)) => (parent, file_name),
        _ => return Ok(false),
    };
    let parent = if parent.as_os_str().is_empty() {
        Path::new(".")
    } else {
        parent
    };
    match fs::canonicalize(parent) {
        Ok(parent) => Ok(parent.join(file_name) == input),
        Err(_) => Ok(false),
    }
}

fn spoiler_path(output: &Path) -> PathBuf {
    output.with_extension("spoiler.json")
}

pub fn run(settings: RandomiserSettings) -> Result<Randomised> {
    if !settings.input_path.exists() {
        return Err(RandomiserError::Config(format!(
            "Input path does not exist: {}",
            settings.input_path.display()
        )));
    }

    if same_file(&settings.input_path, &settings.output_path)? {
        return Err(RandomiserError::Config(
            "Output path must differ from the input image".to_string(),
        ));
    }

    info!(seed = settings.seed, input = %settings.input_path.display(), "reading image");
    let rom = fs::read(&settings.input_path)?;

    let layout = RomLayout::YELLOW;
    if rom.len() < layout.required_len() {
        return Err(RandomiserError::Config(format!(
            "Input image is {} bytes, expected at least {}",
            rom.len(),
            layout.required_len()
        )));
    }

    let table = if settings.randomize_names {
        let table = NameTable::load(&settings.name_table_path)?;
        info!(
            path = %settings.name_table_path.display(),
            rows = table.len(),
            "loaded name table"
        );
        Some(table)
    } else {
        warn!("name randomisation disabled, name bank left untouched");
        None
    };

    let randomised = randomise_rom(&rom, &settings, &layout, &StageTable::YELLOW, table.as_ref())?;

    if let Some(parent) = settings.output_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(&settings.output_path, &randomised.rom)?;
    info!(output = %settings.output_path.display(), "wrote randomised image");

    if settings.debug {
        let log = SpoilerLog {
            seed: settings.seed,
            settings: &settings,
            groups: &randomised.groups,
            names: randomised.names.iter().map(ToString::to_string).collect(),
        };
        let log_path = spoiler_path(&settings.output_path);
        fs::write(&log_path, serde_json::to_string_pretty(&log)?)?;
        info!(path = %log_path.display(), "wrote spoiler log");
    }

    Ok(randomised)
}
