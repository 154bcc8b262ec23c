use tracing::debug;

use crate::layout::NameBank;
use crate::names::GeneratedName;
use crate::patch::{ByteSink, BytePatch};
use crate::{RandomiserError, Result};

/// Copy `source` and overlay the patches and names onto the copy.
///
/// Bytes outside the patched addresses and the written name slots are left
/// exactly as they were in `source`.
pub fn build_image(
    source: &[u8],
    patches: &[BytePatch],
    names: &[GeneratedName],
    bank: &NameBank,
) -> Result<Vec<u8>> {
    let mut output = source.to_vec();
    write_image(output.as_mut_slice(), patches, names, bank)?;
    Ok(output)
}

/// Overlay patches, then names, onto a sink that already holds the base image.
///
/// Names fill slots in order from the start of the bank. Patch order does not
/// matter since no two patches share an address.
pub fn write_image<S: ByteSink + ?Sized>(
    sink: &mut S,
    patches: &[BytePatch],
    names: &[GeneratedName],
    bank: &NameBank,
) -> Result<()> {
    if names.len() > bank.slots {
        return Err(RandomiserError::NameBankOverflow {
            names: names.len(),
            slots: bank.slots,
        });
    }

    for patch in patches {
        patch.write(sink)?;
    }
    debug!(count = patches.len(), "wrote byte patches");

    for (slot, name) in names.iter().enumerate() {
        if name.width() != bank.width {
            return Err(RandomiserError::NameWidth {
                expected: bank.width,
                got: name.width(),
            });
        }
        let encoded = name.encode()?;

        let base = bank.slot_address(slot);
        for (offset, &byte) in encoded.iter().enumerate() {
            sink.write_byte(base + offset, byte)?;
        }
    }
    if !names.is_empty() {
        debug!(count = names.len(), base = bank.base, "wrote name bank");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::names::{NameGenerator, NameTable, TERMINATOR_BYTE};
    use rand::{rngs::StdRng, SeedableRng};

    const BANK: NameBank = NameBank {
        base: 0x40,
        slots: 3,
        width: 5,
    };

    fn names(count: usize) -> Vec<GeneratedName> {
        let table = NameTable::from_rows([('a', [('b', 1)]), ('b', [('\n', 1)])]);
        let generator = NameGenerator::new(&table, 2, BANK.width).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        (0..count)
            .map(|_| generator.generate_from('a', &mut rng).unwrap())
            .collect()
    }

    #[test]
    fn untouched_bytes_match_source() {
        let source: Vec<u8> = (0..=255).collect();
        let patches = vec![BytePatch::new(0x10, 0x00), BytePatch::new(0x20, 0xFF)];
        let names = names(3);

        let output = build_image(&source, &patches, &names, &BANK).unwrap();
        assert_eq!(output.len(), source.len());

        let name_span = BANK.span();
        for (addr, (&out, &src)) in output.iter().zip(&source).enumerate() {
            if addr == 0x10 || addr == 0x20 || name_span.contains(&addr) {
                continue;
            }
            assert_eq!(out, src, "byte 0x{addr:02X} changed");
        }
        assert_eq!(output[0x10], 0x00);
        assert_eq!(output[0x20], 0xFF);
    }

    #[test]
    fn names_fill_slots_in_order() {
        let source = vec![0u8; 0x60];
        let output = build_image(&source, &[], &names(3), &BANK).unwrap();
        let ab = [0x80, 0x81, TERMINATOR_BYTE, TERMINATOR_BYTE, TERMINATOR_BYTE];
        for slot in 0..3 {
            let base = BANK.slot_address(slot);
            assert_eq!(&output[base..base + 5], &ab);
        }
        assert_eq!(output[BANK.span().end], 0);
    }

    #[test]
    fn too_many_names_is_an_error() {
        let source = vec![0u8; 0x60];
        let err = build_image(&source, &[], &names(4), &BANK).unwrap_err();
        assert!(matches!(
            err,
            RandomiserError::NameBankOverflow { names: 4, slots: 3 }
        ));
    }

    #[test]
    fn name_sized_for_another_bank_is_rejected() {
        let table = NameTable::from_rows([('a', [('b', 1)]), ('b', [('\n', 1)])]);
        let generator = NameGenerator::new(&table, 2, BANK.width + 1).unwrap();
        let name = generator
            .generate_from('a', &mut StdRng::seed_from_u64(0))
            .unwrap();

        let source = vec![0u8; 0x60];
        let err = build_image(&source, &[], &[name], &BANK).unwrap_err();
        assert!(matches!(
            err,
            RandomiserError::NameWidth { expected: 5, got: 6 }
        ));
    }

    #[test]
    fn patch_past_the_end_is_an_error() {
        let source = vec![0u8; 8];
        let err = build_image(&source, &[BytePatch::new(8, 1)], &[], &BANK).unwrap_err();
        assert!(matches!(err, RandomiserError::AddressOutOfBounds { .. }));
    }
}
