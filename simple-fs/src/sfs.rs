//! # 文件系统层
//!
//! 构建出磁盘的布局，挂载时读入超级块并重建空闲块位图。
//!
//! 每个 [`SimpleFileSystem`] 独占自己的挂载状态，
//! 多个实例可以同时挂载不同的块设备而互不干扰。

use alloc::sync::Arc;

use block_dev::BlockDevice;
use spin::Mutex;

use crate::bitmap::Bitmap;
use crate::block::Block;
use crate::inode_table;
use crate::layout::{DiskInode, SuperBlock};
use crate::{Error, InodeBlock, Result};

/// 可跨线程共享的文件系统，
/// 锁同时保护空闲块位图和 inode 所在块的读-改-写
pub type SharedFileSystem = Arc<Mutex<SimpleFileSystem>>;

pub struct SimpleFileSystem {
    pub(crate) block_device: Arc<dyn BlockDevice>,
    pub(crate) mounted: Option<Mounted>,
}

/// 挂载期间的状态，卸载即丢弃
#[derive(Debug)]
pub(crate) struct Mounted {
    pub super_block: SuperBlock,
    pub bitmap: Bitmap,
}

impl SimpleFileSystem {
    /// 绑定块设备，此时尚未挂载
    pub fn new(block_device: Arc<dyn BlockDevice>) -> Self {
        Self {
            block_device,
            mounted: None,
        }
    }

    /// 在块设备上建立空的文件系统：写入超级块并把所有 inode 置为无效。
    /// 数据块保持原样。
    pub fn format(&mut self) -> Result<()> {
        if self.mounted.is_some() {
            return Err(Error::AlreadyMounted);
        }

        let total_blocks = self.block_device.num_blocks();
        if total_blocks < 2 {
            return Err(Error::DiskTooSmall);
        }

        let super_block = Block::zeroed(0, &self.block_device).map_mut(0, |sb: &mut SuperBlock| {
            sb.init(total_blocks as u32);
            *sb
        });

        for block_id in 1..=super_block.ninodeblocks as usize {
            Block::zeroed(block_id, &self.block_device)
                .map_mut(0, |inodes: &mut InodeBlock| inodes.fill(DiskInode::default()));
        }

        log::info!(
            "formatted: {} blocks, {} inode blocks, {} inodes",
            super_block.nblocks,
            super_block.ninodeblocks,
            super_block.ninodes
        );
        Ok(())
    }

    /// 校验魔数后读入超级块，并扫描所有有效 inode 重建空闲块位图。
    /// 超级块记录的块数超过块设备时拒绝挂载。
    pub fn mount(&mut self) -> Result<()> {
        let super_block = Block::read(0, &self.block_device).map(0, |sb: &SuperBlock| *sb);
        if !super_block.is_valid() || super_block.nblocks == 0 {
            return Err(Error::BadMagic);
        }
        let device_blocks = self.block_device.num_blocks();
        if super_block.nblocks as usize > device_blocks {
            return Err(Error::DiskSizeMismatch {
                nblocks: super_block.nblocks,
                device_blocks,
            });
        }

        let total_blocks = super_block.nblocks as usize;
        let mut bitmap = Bitmap::new(total_blocks);
        // 超级块与索引节点区域
        for block_id in 0..=super_block.ninodeblocks.min(super_block.nblocks - 1) {
            bitmap.mark_used(block_id);
        }

        let inode_blocks = (super_block.ninodeblocks as usize).min(total_blocks.saturating_sub(1));
        let mut files = 0;
        inode_table::scan(&self.block_device, inode_blocks, |inumber, inode| {
            if !inode.is_valid() {
                return;
            }

            files += 1;
            for block_id in inode.blocks() {
                if bitmap.contains(block_id) {
                    bitmap.mark_used(block_id);
                } else {
                    log::warn!("inode {inumber}: block {block_id} is past the end of disk");
                }
            }
        });

        log::info!(
            "mounted: {files} files, {}/{} blocks in use",
            bitmap.used(),
            total_blocks
        );
        self.mounted = Some(Mounted {
            super_block,
            bitmap,
        });
        Ok(())
    }

    /// 结束挂载，丢弃缓存的超级块与位图
    pub fn unmount(&mut self) -> Result<()> {
        self.mounted.take().map(|_| ()).ok_or(Error::NotMounted)
    }

    #[inline]
    pub fn is_mounted(&self) -> bool {
        self.mounted.is_some()
    }

    /// 挂载时读入的超级块
    pub fn super_block(&self) -> Option<SuperBlock> {
        self.mounted.as_ref().map(|mounted| mounted.super_block)
    }

    /// 空闲块数
    pub fn free_blocks(&self) -> Result<usize> {
        Ok(self.mounted()?.bitmap.free())
    }

    /// 某块当前是否被占用
    pub fn is_block_used(&self, block_id: u32) -> Result<bool> {
        Ok(self.mounted()?.bitmap.is_used(block_id))
    }

    #[inline]
    pub fn block_device(&self) -> &Arc<dyn BlockDevice> {
        &self.block_device
    }

    pub fn into_shared(self) -> SharedFileSystem {
        Arc::new(Mutex::new(self))
    }
}

impl SimpleFileSystem {
    #[inline]
    pub(crate) fn mounted(&self) -> Result<&Mounted> {
        self.mounted.as_ref().ok_or(Error::NotMounted)
    }
}

impl Mounted {
    /// 检查编号范围并读出 inode，无效的 inode 视为不存在
    pub fn valid_inode(&self, block_device: &Arc<dyn BlockDevice>, inumber: u32) -> Result<DiskInode> {
        let ninodes = self.super_block.ninodes;
        if inumber >= ninodes {
            return Err(Error::InodeOutOfRange { inumber, ninodes });
        }

        let inode = inode_table::load(block_device, inumber);
        if inode.is_valid() {
            Ok(inode)
        } else {
            Err(Error::InvalidInode(inumber))
        }
    }
}
