//! # 块设备接口层
//!
//! 块设备是以**块**为单位存储数据的设备，例如磁盘、光盘、U盘等；
//! [`BlockDevice`] 就是对读写块设备的抽象，
//! 实现了此特质的类型称为**块设备驱动**。
//!
//! 所有块号都是设备上的绝对块号，读写均为同步操作。

#![no_std]

extern crate alloc;

mod ram_disk;

use core::any::Any;

pub use self::ram_disk::RamDisk;

/// 每块的字节数
pub const BLOCK_SIZE: usize = 4096;

/// 块设备驱动特质
pub trait BlockDevice: Send + Sync + Any {
    /// 读出一整块，`buf` 的长度恒为 [`BLOCK_SIZE`]
    fn read_block(&self, block_id: usize, buf: &mut [u8]);
    /// 写入一整块，`buf` 的长度恒为 [`BLOCK_SIZE`]
    fn write_block(&self, block_id: usize, buf: &[u8]);
    /// 设备的总块数
    fn num_blocks(&self) -> usize;
}
