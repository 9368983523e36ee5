//! 磁盘内容的诊断输出，只读，不依赖挂载状态

use alloc::vec::Vec;
use core::fmt;

use crate::block::Block;
use crate::inode_table;
use crate::layout::{DiskInode, SuperBlock};
use crate::sfs::SimpleFileSystem;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugReport {
    pub super_block: SuperBlock,
    /// 有效的 inode 及其编号
    pub inodes: Vec<(u32, DiskInode)>,
}

impl SimpleFileSystem {
    /// 直接从磁盘读出超级块与全部有效 inode。
    /// 魔数不符时不遍历 inode 表。
    pub fn debug(&self) -> DebugReport {
        let super_block = Block::read(0, &self.block_device).map(0, |sb: &SuperBlock| *sb);

        let mut inodes = Vec::new();
        if super_block.is_valid() {
            let inode_blocks = (super_block.ninodeblocks as usize)
                .min(self.block_device.num_blocks().saturating_sub(1));
            inode_table::scan(&self.block_device, inode_blocks, |inumber, inode| {
                if inode.is_valid() {
                    inodes.push((inumber, *inode));
                }
            });
        }

        DebugReport {
            super_block,
            inodes,
        }
    }
}

impl fmt::Display for DebugReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sb = &self.super_block;
        writeln!(f, "superblock:")?;
        if sb.is_valid() {
            writeln!(f, "    magic number is valid")?;
        } else {
            writeln!(f, "    magic number is invalid")?;
        }
        writeln!(f, "    {} blocks", sb.nblocks)?;
        writeln!(f, "    {} inode blocks", sb.ninodeblocks)?;
        writeln!(f, "    {} inodes", sb.ninodes)?;

        for (inumber, inode) in &self.inodes {
            writeln!(f, "inode {inumber}")?;
            writeln!(f, "    size: {} bytes", inode.size)?;
            write!(f, "    Blocks:")?;
            // 列出全部非零索引，包括大小范围之外残留的
            for block_id in inode.direct.iter().filter(|&&block_id| block_id != 0) {
                write!(f, " {block_id}")?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}
