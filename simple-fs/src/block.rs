//! # 块缓冲区
//!
//! 把一个块完整地读入内存，按磁盘数据结构解释其中的字节，
//! 通过 [`Block::get_mut`] 修改过的块在离开作用域时写回块设备。
//!
//! 这里不缓存任何块：每个 [`Block`] 都对应一次完整的读写往返，
//! 同一块内相邻的 inode 因此总能被原样保留。

use alloc::sync::Arc;
use core::mem;

use block_dev::BlockDevice;

use crate::BLOCK_SIZE;

/// 可以由块内字节直接解释出来的磁盘数据结构
///
/// # Safety
///
/// 实现者必须是 `repr(C)` 且不含填充字节，任意位模式都是合法值。
pub unsafe trait OnDisk: Sized {}

unsafe impl OnDisk for u8 {}
unsafe impl<T: OnDisk, const N: usize> OnDisk for [T; N] {}

#[repr(C, align(8))]
struct BlockData([u8; BLOCK_SIZE]);

/// 内存中的块
pub struct Block {
    /// 块的内容
    data: BlockData,
    /// 对应的块ID
    block_id: usize,
    /// 底层块设备的引用
    block_device: Arc<dyn BlockDevice>,
    /// 是否为脏块
    modified: bool,
}

impl Block {
    /// 从块设备读出一块
    pub fn read(block_id: usize, block_device: &Arc<dyn BlockDevice>) -> Self {
        let mut data = BlockData([0; BLOCK_SIZE]);
        block_device.read_block(block_id, &mut data.0);

        Self {
            data,
            block_id,
            block_device: block_device.clone(),
            modified: false,
        }
    }

    /// 不读取块设备，直接以全零内容覆盖该块
    pub fn zeroed(block_id: usize, block_device: &Arc<dyn BlockDevice>) -> Self {
        Self {
            data: BlockData([0; BLOCK_SIZE]),
            block_id,
            block_device: block_device.clone(),
            modified: true,
        }
    }

    pub fn sync(&mut self) {
        if self.modified {
            self.modified = false;
            self.block_device.write_block(self.block_id, &self.data.0);
        }
    }

    pub fn get<T: OnDisk>(&self, offset: usize) -> &T {
        Self::check::<T>(offset);
        let addr = self.data.0[offset..].as_ptr().cast::<T>();
        unsafe { &*addr }
    }

    pub fn get_mut<T: OnDisk>(&mut self, offset: usize) -> &mut T {
        Self::check::<T>(offset);
        self.modified = true;
        let addr = self.data.0[offset..].as_mut_ptr().cast::<T>();
        unsafe { &mut *addr }
    }

    #[inline]
    pub fn map<T: OnDisk, V>(&self, offset: usize, f: impl FnOnce(&T) -> V) -> V {
        f(self.get(offset))
    }

    #[inline]
    pub fn map_mut<T: OnDisk, V>(&mut self, offset: usize, f: impl FnOnce(&mut T) -> V) -> V {
        f(self.get_mut(offset))
    }
}

impl Block {
    #[inline]
    fn check<T>(offset: usize) {
        assert!(mem::size_of::<T>() + offset <= BLOCK_SIZE);
        assert_eq!(offset % mem::align_of::<T>(), 0, "misaligned on-disk view");
    }
}

impl Drop for Block {
    fn drop(&mut self) {
        self.sync();
    }
}
