use crate::block::OnDisk;
use crate::{INODES_PER_BLOCK, MAGIC};

/// 超级块：
/// - 提供文件系统合法性校验；
/// - 记录索引节点区域的大小
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct SuperBlock {
    /// 魔数：用于校验文件系统合法性
    magic: u32,
    /// 文件系统占据块数
    pub nblocks: u32,
    /// 索引节点区域的块数
    pub ninodeblocks: u32,
    /// 索引节点总数
    pub ninodes: u32,
}

unsafe impl OnDisk for SuperBlock {}

impl SuperBlock {
    /// 按总块数推算布局：索引节点区域占总块数的十分之一（向上取整）
    pub fn init(&mut self, nblocks: u32) {
        let ninodeblocks = nblocks.div_ceil(10);

        *self = Self {
            magic: MAGIC,
            nblocks,
            ninodeblocks,
            ninodes: ninodeblocks * INODES_PER_BLOCK as u32,
        };
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.magic == MAGIC
    }

    #[inline]
    pub fn magic(&self) -> u32 {
        self.magic
    }

    /// 首个数据块的块号
    #[inline]
    pub fn data_area_start_block(&self) -> u32 {
        self.ninodeblocks + 1
    }
}
