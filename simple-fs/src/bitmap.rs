use alloc::vec;
use alloc::vec::Vec;

/// 空闲块位图，每一位对应一个块，置位表示已占用
///
/// 位图只存在于内存，挂载时由 inode 表重建；
/// 总块数之外的填充位一开始就置位，保证不会被分配出去。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    groups: Vec<u64>,
    /// 位图所指示区域的总块数
    blocks: usize,
}

impl Bitmap {
    pub fn new(blocks: usize) -> Self {
        let mut groups = vec![0u64; blocks.div_ceil(64)];
        let tail = blocks % 64;
        if let (Some(last), true) = (groups.last_mut(), tail != 0) {
            *last = !0 << tail;
        }

        Self { groups, blocks }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.blocks
    }

    /// 块号是否落在位图范围内
    #[inline]
    pub fn contains(&self, block_id: u32) -> bool {
        (block_id as usize) < self.blocks
    }

    /// 分配编号最小的空闲块并返回其编号。
    /// 若所有块都已占用，则返回空。
    pub fn alloc(&mut self) -> Option<u32> {
        let (group_index, ingroup_index) =
            self.groups
                .iter()
                .enumerate()
                .find_map(|(group_index, &bits)| {
                    (bits != u64::MAX).then_some((group_index, bits.trailing_ones()))
                })?;

        self.groups[group_index] |= 1 << ingroup_index;
        Some((group_index * 64) as u32 + ingroup_index)
    }

    pub fn mark_used(&mut self, block_id: u32) {
        let (group_index, ingroup_index) = self.locate(block_id);
        self.groups[group_index] |= 1 << ingroup_index;
    }

    pub fn dealloc(&mut self, block_id: u32) {
        let (group_index, ingroup_index) = self.locate(block_id);
        if self.groups[group_index] & (1 << ingroup_index) == 0 {
            log::warn!("block {block_id} released twice");
        }
        self.groups[group_index] &= !(1 << ingroup_index);
    }

    pub fn is_used(&self, block_id: u32) -> bool {
        let (group_index, ingroup_index) = self.locate(block_id);
        self.groups[group_index] & (1 << ingroup_index) != 0
    }

    /// 已占用的块数
    pub fn used(&self) -> usize {
        let padding = self.groups.len() * 64 - self.blocks;
        self.groups
            .iter()
            .map(|bits| bits.count_ones() as usize)
            .sum::<usize>()
            - padding
    }

    #[inline]
    pub fn free(&self) -> usize {
        self.blocks - self.used()
    }

    #[inline]
    fn locate(&self, block_id: u32) -> (usize, u32) {
        let block_id = block_id as usize;
        assert!(
            block_id < self.blocks,
            "block {block_id} out of range ({} blocks)",
            self.blocks
        );
        (block_id / 64, (block_id % 64) as u32)
    }
}
