use std::ops::Range;

use crate::patch::{ByteSource, PatchGroup};
use crate::{RandomiserError, Result};

/// Fixed-stride table of records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordBank {
    pub base: usize,
    pub stride: usize,
    pub count: usize,
}

impl RecordBank {
    pub fn record_address(&self, index: usize) -> usize {
        self.base + index * self.stride
    }

    pub fn span(&self) -> Range<usize> {
        self.base..self.base + self.stride * self.count
    }
}

/// Fixed-width name slots stored back to back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NameBank {
    pub base: usize,
    pub slots: usize,
    pub width: usize,
}

impl NameBank {
    pub fn slot_address(&self, slot: usize) -> usize {
        self.base + slot * self.width
    }

    pub fn span(&self) -> Range<usize> {
        self.base..self.base + self.slots * self.width
    }
}

/// Internal creature IDs run 1..=max with gaps for unused slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InternalIds {
    pub max: u8,
    pub unused: &'static [u8],
}

impl InternalIds {
    pub const YELLOW: InternalIds = InternalIds {
        max: 190,
        unused: &[
            31, 32, 50, 52, 56, 61, 62, 63, 67, 68, 69, 79, 80, 81, 86, 87, 94, 95, 115, 121, 122,
            127, 134, 135, 137, 140, 146, 156, 159, 160, 161, 162, 172, 174, 175, 181, 182, 183,
            184,
        ],
    };

    pub fn is_valid(&self, id: u8) -> bool {
        (1..=self.max).contains(&id) && !self.unused.contains(&id)
    }

    pub fn valid_ids(&self) -> Vec<u8> {
        (1..=self.max).filter(|&id| self.is_valid(id)).collect()
    }
}

/// Per-creature fields of the base stat bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatField {
    Hp,
    Attack,
    Defense,
    Speed,
    Special,
    Type1,
    Type2,
    CatchRate,
    ExpYield,
    Move1,
    Move2,
    Move3,
    Move4,
    GrowthRate,
}

impl StatField {
    /// Byte offset of the field inside a base stat record.
    pub fn offset(self) -> usize {
        match self {
            StatField::Hp => 1,
            StatField::Attack => 2,
            StatField::Defense => 3,
            StatField::Speed => 4,
            StatField::Special => 5,
            StatField::Type1 => 6,
            StatField::Type2 => 7,
            StatField::CatchRate => 8,
            StatField::ExpYield => 9,
            StatField::Move1 => 15,
            StatField::Move2 => 16,
            StatField::Move3 => 17,
            StatField::Move4 => 18,
            StatField::GrowthRate => 19,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            StatField::Hp => "base_hp",
            StatField::Attack => "base_attack",
            StatField::Defense => "base_defense",
            StatField::Speed => "base_speed",
            StatField::Special => "base_special",
            StatField::Type1 => "type_1",
            StatField::Type2 => "type_2",
            StatField::CatchRate => "catch_rate",
            StatField::ExpYield => "exp_yield",
            StatField::Move1 => "starting_move_1",
            StatField::Move2 => "starting_move_2",
            StatField::Move3 => "starting_move_3",
            StatField::Move4 => "starting_move_4",
            StatField::GrowthRate => "growth_rate",
        }
    }
}

/// Where every randomisable region lives in the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RomLayout {
    /// Base stat records, in Pokedex order rather than internal ID order.
    pub stats: RecordBank,
    pub palettes: (usize, usize),
    /// Two-byte evolution/learnset pointers, one slot per internal ID.
    pub evolution_learnsets: RecordBank,
    /// Three interleaved cry parameters per record.
    pub cries: RecordBank,
    pub names: NameBank,
    pub ids: InternalIds,
}

impl RomLayout {
    pub const YELLOW: RomLayout = RomLayout {
        // Mew (the 151st record) is left alone; its entry lives elsewhere in
        // Red/Blue and patching it there corrupts unrelated data.
        stats: RecordBank {
            base: 0x0383DE,
            stride: 28,
            count: 150,
        },
        palettes: (0x072922, 0x0729B7),
        evolution_learnsets: RecordBank {
            base: 0x03B1E5,
            stride: 2,
            count: 190,
        },
        cries: RecordBank {
            base: 0x039462,
            stride: 3,
            count: 436,
        },
        names: NameBank {
            base: 0x0E8000,
            slots: 189,
            width: 10,
        },
        ids: InternalIds::YELLOW,
    };

    pub fn stat_addresses(&self, field: StatField) -> Vec<usize> {
        (0..self.stats.count)
            .map(|i| self.stats.record_address(i) + field.offset())
            .collect()
    }

    pub fn palette_addresses(&self) -> Vec<usize> {
        (self.palettes.0..self.palettes.1).collect()
    }

    /// `(internal ID, record address)` for every used ID in the pointer bank.
    pub fn evolution_learnset_slots(&self) -> Vec<(u8, usize)> {
        (0..self.evolution_learnsets.count)
            .filter_map(|slot| {
                let id = u8::try_from(slot + 1).ok()?;
                self.ids
                    .is_valid(id)
                    .then(|| (id, self.evolution_learnsets.record_address(slot)))
            })
            .collect()
    }

    pub fn cry_addresses(&self) -> Vec<usize> {
        let bank = self.cries;
        (0..bank.count)
            .flat_map(|i| {
                let base = bank.record_address(i);
                [base, base + 1, base + 2]
            })
            .collect()
    }

    pub fn stat_group<S: ByteSource + ?Sized>(&self, source: &S, field: StatField) -> Result<PatchGroup> {
        PatchGroup::read(source, field.name(), 1, self.stat_addresses(field))
    }

    pub fn palette_group<S: ByteSource + ?Sized>(&self, source: &S) -> Result<PatchGroup> {
        PatchGroup::read(source, "palettes", 1, self.palette_addresses())
    }

    /// Pointer pairs for every used ID, with the IDs in record order.
    pub fn evolution_learnset_group<S: ByteSource + ?Sized>(
        &self,
        source: &S,
    ) -> Result<(PatchGroup, Vec<u8>)> {
        let slots = self.evolution_learnset_slots();
        let ids = slots.iter().map(|&(id, _)| id).collect();
        let addresses = slots
            .iter()
            .flat_map(|&(_, base)| [base, base + 1])
            .collect();
        let group = PatchGroup::read(source, "evolution_learnsets", 2, addresses)?;
        Ok((group, ids))
    }

    pub fn cry_group<S: ByteSource + ?Sized>(&self, source: &S) -> Result<PatchGroup> {
        PatchGroup::read(source, "cries", 3, self.cry_addresses())
    }

    fn regions(&self) -> [(&'static str, Range<usize>); 5] {
        [
            ("stats", self.stats.span()),
            ("palettes", self.palettes.0..self.palettes.1),
            ("evolution_learnsets", self.evolution_learnsets.span()),
            ("cries", self.cries.span()),
            ("names", self.names.span()),
        ]
    }

    /// Smallest image that contains every catalogued region.
    pub fn required_len(&self) -> usize {
        self.regions()
            .iter()
            .map(|(_, range)| range.end)
            .max()
            .unwrap_or(0)
    }

    /// Check every region fits in an image of `len` bytes and no two
    /// regions share a byte.
    pub fn validate(&self, len: usize) -> Result<()> {
        let regions = self.regions();

        for (name, range) in &regions {
            if range.start > range.end {
                return Err(RandomiserError::Config(format!(
                    "{} region starts at 0x{:06X}, after its end 0x{:06X}",
                    name, range.start, range.end
                )));
            }
            if range.end > len {
                return Err(RandomiserError::Config(format!(
                    "{} region ends at 0x{:06X}, beyond image length 0x{:06X}",
                    name, range.end, len
                )));
            }
        }

        for (i, (first, a)) in regions.iter().enumerate() {
            for (second, b) in &regions[i + 1..] {
                if a.start < b.end && b.start < a.end {
                    return Err(RandomiserError::RegionOverlap {
                        first: *first,
                        second: *second,
                    });
                }
            }
        }

        Ok(())
    }
}
