use enumflags2::{bitflags, BitFlags};

use crate::block::OnDisk;
use crate::{BLOCK_SIZE, POINTERS_PER_INODE};

/// 磁盘上的索引节点，固定 32 字节
///
/// 删除时只清除 [`InodeFlag::Valid`]，大小与直接索引原样留在磁盘上，
/// 因此读取时必须先看有效位。
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct DiskInode {
    flags: u32,
    /// 文件字节数
    pub size: u32,
    /// 直接索引块，0 表示未分配（0 号块是超级块，永远不会分给文件）
    pub direct: [u32; POINTERS_PER_INODE],
}

#[bitflags]
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InodeFlag {
    Valid = 0b1,
}

unsafe impl OnDisk for DiskInode {}

impl DiskInode {
    /// 标记为有效的空文件
    #[inline]
    pub fn init(&mut self) {
        *self = Self {
            flags: BitFlags::from_flag(InodeFlag::Valid).bits(),
            ..Default::default()
        }
    }

    #[inline]
    pub fn flags(&self) -> BitFlags<InodeFlag> {
        BitFlags::from_bits_truncate(self.flags)
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.flags().contains(InodeFlag::Valid)
    }

    #[inline]
    pub fn invalidate(&mut self) {
        let mut flags = self.flags();
        flags.remove(InodeFlag::Valid);
        self.flags = flags.bits();
    }

    /// 计算容纳 `size` 字节需要多少个数据块
    #[inline]
    pub fn count_data_block(size: usize) -> usize {
        size.div_ceil(BLOCK_SIZE)
    }

    /// 当前大小占用的直接索引数；损坏的大小不会越过索引数组
    #[inline]
    pub fn data_blocks(&self) -> usize {
        Self::count_data_block(self.size as usize).min(POINTERS_PER_INODE)
    }

    /// 当前大小范围内已分配的数据块
    pub fn blocks(&self) -> impl Iterator<Item = u32> + '_ {
        self.direct[..self.data_blocks()]
            .iter()
            .copied()
            .filter(|&block_id| block_id != 0)
    }
}
