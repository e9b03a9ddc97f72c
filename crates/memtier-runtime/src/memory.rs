//! The three memory tiers visible to a kernel.
//!
//! - Device-global memory lives behind a [`Handle`] and is bound to a kernel either as a
//!   read-only [`GlobalRead`] or a write-only [`GlobalWrite`] view.
//! - Group-shared memory is a [`SharedMemory`] region allocated by the runtime for every group
//!   of a launch and dropped once that group completes.
//! - Private memory is a [`PrivateArray`] owned by a single unit for the duration of its body.
//!
//! Global and shared words are stored as relaxed atomic cells. Kernels never rely on them for
//! ordering, the group barrier does that, but it keeps an incorrectly synchronized kernel
//! observable as wrong results instead of undefined behavior.
use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::ops::{Index, IndexMut};
use core::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use crate::error::CapacityError;

static HANDLE_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Identifies a buffer allocated in device-global memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandleId(u64);

impl HandleId {
    fn next() -> Self {
        Self(HANDLE_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

struct Storage {
    words: Box<[AtomicU32]>,
}

impl Storage {
    fn zeroed(len: usize) -> Self {
        Self {
            words: (0..len).map(|_| AtomicU32::new(0)).collect(),
        }
    }

    fn from_slice(data: &[f32]) -> Self {
        Self {
            words: data.iter().map(|v| AtomicU32::new(v.to_bits())).collect(),
        }
    }

    #[inline(always)]
    fn load(&self, index: usize) -> f32 {
        f32::from_bits(self.words[index].load(Ordering::Relaxed))
    }

    #[inline(always)]
    fn store(&self, index: usize, value: f32) {
        self.words[index].store(value.to_bits(), Ordering::Relaxed)
    }
}

/// A buffer of `f32` in device-global memory.
///
/// Cloning a handle doesn't copy the buffer, both clones refer to the same storage.
#[derive(Clone)]
pub struct Handle {
    id: HandleId,
    storage: Arc<Storage>,
}

impl core::fmt::Debug for Handle {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Handle")
            .field("id", &self.id)
            .field("len", &self.len())
            .finish()
    }
}

impl Handle {
    pub(crate) fn from_slice(data: &[f32]) -> Self {
        Self {
            id: HandleId::next(),
            storage: Arc::new(Storage::from_slice(data)),
        }
    }

    pub(crate) fn empty(len: usize) -> Self {
        Self {
            id: HandleId::next(),
            storage: Arc::new(Storage::zeroed(len)),
        }
    }

    /// The identifier of the underlying buffer.
    pub fn id(&self) -> HandleId {
        self.id
    }

    /// Number of `f32` elements in the buffer.
    pub fn len(&self) -> usize {
        self.storage.words.len()
    }

    /// Whether the buffer holds no element.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether both handles refer to the same device buffer.
    pub fn shares_storage(&self, other: &Handle) -> bool {
        Arc::ptr_eq(&self.storage, &other.storage)
    }

    /// Binds the buffer as a read-only kernel argument.
    pub fn binding_read(&self) -> GlobalRead {
        GlobalRead {
            storage: self.storage.clone(),
        }
    }

    /// Binds the buffer as a write-only kernel argument.
    pub fn binding_write(&self) -> GlobalWrite {
        GlobalWrite {
            storage: self.storage.clone(),
        }
    }

    pub(crate) fn read(&self) -> Vec<f32> {
        (0..self.len()).map(|i| self.storage.load(i)).collect()
    }
}

/// Read-only view of a device-global buffer.
#[derive(Clone)]
pub struct GlobalRead {
    storage: Arc<Storage>,
}

impl GlobalRead {
    /// Reads the element at `index`.
    ///
    /// # Panics
    ///
    /// If `index` is out of bounds.
    #[inline(always)]
    pub fn load(&self, index: usize) -> f32 {
        self.storage.load(index)
    }

    /// Number of elements in the bound buffer.
    pub fn len(&self) -> usize {
        self.storage.words.len()
    }

    /// Whether the bound buffer holds no element.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Write-only view of a device-global buffer.
#[derive(Clone)]
pub struct GlobalWrite {
    storage: Arc<Storage>,
}

impl GlobalWrite {
    /// Writes `value` at `index`.
    ///
    /// # Panics
    ///
    /// If `index` is out of bounds.
    #[inline(always)]
    pub fn store(&self, index: usize, value: f32) {
        self.storage.store(index, value)
    }

    /// Number of elements in the bound buffer.
    pub fn len(&self) -> usize {
        self.storage.words.len()
    }

    /// Whether the bound buffer holds no element.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Memory region shared by every unit of a group.
///
/// Its content is unspecified when a group starts (zeroed by this runtime) and is discarded
/// when the group completes.
pub struct SharedMemory {
    words: Box<[AtomicU32]>,
}

impl SharedMemory {
    pub(crate) fn new(len: usize) -> Self {
        Self {
            words: (0..len).map(|_| AtomicU32::new(0)).collect(),
        }
    }

    /// Reads the element at `index`.
    #[inline(always)]
    pub fn load(&self, index: usize) -> f32 {
        f32::from_bits(self.words[index].load(Ordering::Relaxed))
    }

    /// Writes `value` at `index`.
    #[inline(always)]
    pub fn store(&self, index: usize, value: f32) {
        self.words[index].store(value.to_bits(), Ordering::Relaxed)
    }

    /// Number of elements in the region.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Whether the region holds no element.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Fixed-capacity storage exclusively owned by one unit.
///
/// The capacity is a hard resource limit: constructing an array longer than `CAPACITY`
/// fails instead of truncating.
pub struct PrivateArray<const CAPACITY: usize> {
    data: [f32; CAPACITY],
    len: usize,
}

impl<const CAPACITY: usize> PrivateArray<CAPACITY> {
    /// Maximum number of elements the array can hold.
    pub const fn capacity() -> usize {
        CAPACITY
    }

    /// Creates a zeroed array holding `len` elements.
    pub fn new(len: usize) -> Result<Self, CapacityError> {
        if len > CAPACITY {
            return Err(CapacityError {
                requested: len,
                capacity: CAPACITY,
            });
        }

        Ok(Self {
            data: [0.0; CAPACITY],
            len,
        })
    }

    /// Number of elements in use.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether no element is in use.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<const CAPACITY: usize> Index<usize> for PrivateArray<CAPACITY> {
    type Output = f32;

    fn index(&self, index: usize) -> &Self::Output {
        &self.data[..self.len][index]
    }
}

impl<const CAPACITY: usize> IndexMut<usize> for PrivateArray<CAPACITY> {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.data[..self.len][index]
    }
}
