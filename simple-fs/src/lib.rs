#![no_std]

extern crate alloc;

/* simple-fs 的整体架构，自上而下 */

// 文件操作层：创建、删除、读写文件
mod file;

// 文件系统层：格式化、挂载，持有挂载期间的状态
mod sfs;

// 诊断输出：只读地遍历磁盘
mod debug;

// 空闲块位图：挂载时重建，从不落盘
mod bitmap;

// 索引节点表：inode 编号与磁盘位置的换算与读写
mod inode_table;

// 磁盘数据结构层：表示磁盘文件系统的数据结构
mod layout;

// 块缓冲区：对单个块的一次读写往返
mod block;

mod error;

pub use block_dev::{BlockDevice, BLOCK_SIZE};

pub use self::{
    bitmap::Bitmap,
    debug::DebugReport,
    error::{Error, Result},
    layout::{DiskInode, InodeFlag, SuperBlock},
    sfs::{SharedFileSystem, SimpleFileSystem},
};

pub const MAGIC: u32 = 0xf0f0_3410;
pub const INODES_PER_BLOCK: usize = 128;
pub const POINTERS_PER_INODE: usize = 6;
/// 单个文件的最大字节数
pub const MAX_FILE_SIZE: usize = POINTERS_PER_INODE * BLOCK_SIZE;

type DataBlock = [u8; BLOCK_SIZE];
type InodeBlock = [DiskInode; INODES_PER_BLOCK];
