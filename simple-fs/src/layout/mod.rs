//! # 磁盘数据结构层
//!
//! simple-fs 的磁盘布局：
//! 超级块 | 索引节点区域 | 数据块区域
//!
//! 空闲块位图不在磁盘上，见 [`Bitmap`](crate::Bitmap)。

mod super_block;
pub use super_block::SuperBlock;

mod inode;
pub use inode::{DiskInode, InodeFlag};
