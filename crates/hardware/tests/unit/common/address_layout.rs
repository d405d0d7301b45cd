//! Address Decomposition Tests.
//!
//! Verifies the tag/set/offset split of 32-bit addresses and the inverse
//! reconstruction used by write-back.

use memsim_core::common::{AddressLayout, BlockAddr, ConfigError, is_power_of_two, log2};
use proptest::prelude::*;

// ══════════════════════════════════════════════════════════
// 1. Bit helpers
// ══════════════════════════════════════════════════════════

#[test]
fn power_of_two_detection() {
    for n in [1u32, 2, 4, 64, 4096, 1 << 31] {
        assert!(is_power_of_two(n), "{n} is a power of two");
    }
    for n in [0u32, 3, 6, 100, u32::MAX] {
        assert!(!is_power_of_two(n), "{n} is not a power of two");
    }
}

#[test]
fn log2_of_powers() {
    assert_eq!(log2(1).unwrap(), 0);
    assert_eq!(log2(64).unwrap(), 6);
    assert_eq!(log2(1 << 31).unwrap(), 31);
}

#[test]
fn log2_rejects_non_powers() {
    assert!(matches!(log2(0), Err(ConfigError::NotPowerOfTwo { value: 0 })));
    assert!(matches!(log2(12), Err(ConfigError::NotPowerOfTwo { value: 12 })));
}

// ══════════════════════════════════════════════════════════
// 2. Decomposition
// ══════════════════════════════════════════════════════════

#[test]
fn field_widths() {
    let layout = AddressLayout::new(64, 256).unwrap();
    assert_eq!(layout.offset_bits(), 6);
    assert_eq!(layout.set_bits(), 8);
    assert_eq!(layout.tag_bits(), 18);
}

#[test]
fn decompose_known_address() {
    let layout = AddressLayout::new(64, 256).unwrap();
    assert_eq!(
        layout.decompose(0x1234_5678),
        BlockAddr {
            tag: 0x48D1,
            set: 0x59,
            offset: 0x38,
        }
    );
}

#[test]
fn single_set_maps_everything_to_set_zero() {
    let layout = AddressLayout::new(16, 1).unwrap();
    assert_eq!(layout.set_bits(), 0);
    for addr in [0u32, 0x10, 0xFFFF_FFF0, 0x8000_0000] {
        assert_eq!(layout.set_index(addr), 0);
        assert_eq!(layout.tag(addr), addr >> 4);
    }
}

#[test]
fn one_byte_blocks_have_no_offset() {
    let layout = AddressLayout::new(1, 4).unwrap();
    assert_eq!(layout.offset(0xFF), 0);
    assert_eq!(layout.set_index(0x7), 3);
    assert_eq!(layout.tag(0x7), 1);
}

#[test]
fn layout_rejects_non_power_geometry() {
    assert!(AddressLayout::new(48, 4).is_err());
    assert!(AddressLayout::new(64, 3).is_err());
}

// ══════════════════════════════════════════════════════════
// 3. Reconstruction
// ══════════════════════════════════════════════════════════

#[test]
fn base_address_of_top_block() {
    let layout = AddressLayout::new(4, 4).unwrap();
    let d = layout.decompose(u32::MAX);
    assert_eq!(layout.base_address(d.tag, d.set), 0xFFFF_FFFC);
}

proptest! {
    #[test]
    fn reconstruct_yields_block_base(
        addr in any::<u32>(),
        offset_bits in 0u32..=12,
        set_bits in 0u32..=12,
    ) {
        let block_size = 1u32 << offset_bits;
        let layout = AddressLayout::new(block_size, 1 << set_bits).unwrap();
        let d = layout.decompose(addr);

        prop_assert_eq!(layout.base_address(d.tag, d.set), addr & !(block_size - 1));
        prop_assert_eq!(layout.block_base(addr), addr & !(block_size - 1));
        prop_assert!(d.offset < block_size);
        prop_assert!(d.set < (1 << set_bits));
    }
}
