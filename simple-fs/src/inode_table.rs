//! # 索引节点表
//!
//! inode 紧密排列在 1 号块开始的索引节点区域，每块 [`INODES_PER_BLOCK`] 个。
//! 所有访问都直接经过块设备，不做缓存。

use alloc::sync::Arc;
use core::mem;

use block_dev::BlockDevice;

use crate::block::Block;
use crate::layout::DiskInode;
use crate::{InodeBlock, INODES_PER_BLOCK};

const INODE_SIZE: usize = mem::size_of::<DiskInode>();

/// 通过编号获取 inode 在磁盘上的位置：**块ID**以及**块内偏移**
#[inline]
pub fn disk_inode_pos(inumber: u32) -> (usize, usize) {
    let inumber = inumber as usize;
    // 跳过超级块
    let block_id = inumber / INODES_PER_BLOCK + 1;
    let block_offset = inumber % INODES_PER_BLOCK * INODE_SIZE;

    (block_id, block_offset)
}

pub fn load(block_device: &Arc<dyn BlockDevice>, inumber: u32) -> DiskInode {
    let (block_id, block_offset) = disk_inode_pos(inumber);
    Block::read(block_id, block_device).map(block_offset, |inode: &DiskInode| *inode)
}

/// 读出 inode 所在的整块，只覆盖其中一个槽位再写回
pub fn save(block_device: &Arc<dyn BlockDevice>, inumber: u32, inode: &DiskInode) {
    let (block_id, block_offset) = disk_inode_pos(inumber);
    Block::read(block_id, block_device)
        .map_mut(block_offset, |slot: &mut DiskInode| *slot = *inode);
}

/// 按编号升序遍历 `inode_blocks` 个索引节点块中的全部 inode
pub fn scan(
    block_device: &Arc<dyn BlockDevice>,
    inode_blocks: usize,
    mut f: impl FnMut(u32, &DiskInode),
) {
    for block_index in 0..inode_blocks {
        Block::read(block_index + 1, block_device).map(0, |inodes: &InodeBlock| {
            for (slot, inode) in inodes.iter().enumerate() {
                f((block_index * INODES_PER_BLOCK + slot) as u32, inode);
            }
        });
    }
}

/// 找到编号最小的无效 inode，初始化为空文件并立即写回，返回其编号
pub fn claim_free(block_device: &Arc<dyn BlockDevice>, inode_blocks: usize) -> Option<u32> {
    for block_index in 0..inode_blocks {
        let mut block = Block::read(block_index + 1, block_device);
        let Some(slot) = block
            .get::<InodeBlock>(0)
            .iter()
            .position(|inode| !inode.is_valid())
        else {
            continue;
        };

        block.get_mut::<InodeBlock>(0)[slot].init();
        return Some((block_index * INODES_PER_BLOCK + slot) as u32);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use block_dev::RamDisk;

    #[test]
    fn position() {
        assert_eq!(disk_inode_pos(0), (1, 0));
        assert_eq!(disk_inode_pos(1), (1, 32));
        assert_eq!(disk_inode_pos(127), (1, 127 * 32));
        assert_eq!(disk_inode_pos(128), (2, 0));
        assert_eq!(disk_inode_pos(300), (3, 44 * 32));
    }

    #[test]
    fn save_keeps_siblings() {
        let disk = Arc::new(RamDisk::new(4));
        let dev: Arc<dyn BlockDevice> = disk.clone();

        let mut first = DiskInode::default();
        first.init();
        first.size = 10;
        first.direct[0] = 3;
        save(&dev, 0, &first);

        let mut second = DiskInode::default();
        second.init();
        second.size = 20;
        save(&dev, 1, &second);

        assert_eq!(load(&dev, 0), first);
        assert_eq!(load(&dev, 1), second);
        assert!(!load(&dev, 2).is_valid());

        // 每次存取都是完整的块往返
        assert_eq!(disk.writes(), 2);
        assert_eq!(disk.reads(), 5);
    }

    #[test]
    fn claim_lowest_first() {
        let dev: Arc<dyn BlockDevice> = Arc::new(RamDisk::new(4));

        let mut taken = DiskInode::default();
        taken.init();
        for inumber in [0, 1, 3] {
            save(&dev, inumber, &taken);
        }

        assert_eq!(claim_free(&dev, 2), Some(2));
        assert_eq!(claim_free(&dev, 2), Some(4));
        assert!(load(&dev, 2).is_valid());

        let mut seen = 0;
        scan(&dev, 2, |_, inode| seen += inode.is_valid() as usize);
        assert_eq!(seen, 5);
    }

    #[test]
    fn claim_exhausted() {
        let dev: Arc<dyn BlockDevice> = Arc::new(RamDisk::new(2));
        for expected in 0..INODES_PER_BLOCK as u32 {
            assert_eq!(claim_free(&dev, 1), Some(expected));
        }
        assert_eq!(claim_free(&dev, 1), None);
    }
}
