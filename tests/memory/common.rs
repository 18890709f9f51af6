/*!
 * Shared helpers for memory tests
 */

use memsim::Block;

/// Assert a snapshot satisfies the ledger invariants: start-sorted,
/// contiguous, covering `[0, total)`, positive sizes, no adjacent free blocks
pub fn assert_well_formed(blocks: &[Block], total: usize) {
    assert!(!blocks.is_empty(), "ledger has no blocks");
    let mut cursor = 0;
    for (i, block) in blocks.iter().enumerate() {
        assert!(block.size > 0, "zero-size block at {}", block.start);
        assert_eq!(
            block.start, cursor,
            "gap or overlap before block at index {}",
            i
        );
        cursor += block.size;
        if i > 0 {
            assert!(
                !(block.free && blocks[i - 1].free),
                "adjacent free blocks at {} and {}",
                blocks[i - 1].start,
                block.start
            );
        }
    }
    assert_eq!(cursor, total, "blocks do not cover the address space");
}

/// Collapse a snapshot to (start, size, free) triples, ignoring ids
pub fn layout(blocks: &[Block]) -> Vec<(usize, usize, bool)> {
    blocks
        .iter()
        .map(|block| (block.start, block.size, block.free))
        .collect()
}
