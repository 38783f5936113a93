//! Reusable scratch buffers for per-frame work.

/// Fixed set of `Vec<f64>` buffers.
///
/// Buffers are lent out for the duration of a closure and always returned,
/// whether the closure succeeds or fails. When the pool is empty a fresh
/// buffer is allocated for that call and dropped afterwards.
#[derive(Debug, Clone)]
pub struct BufferPool {
    free: Vec<Vec<f64>>,
    size: usize,
    buffer_capacity: usize,
    fallbacks: u64,
}

impl BufferPool {
    /// `size` buffers of `buffer_capacity` elements each.
    pub fn new(size: usize, buffer_capacity: usize) -> Self {
        Self {
            free: (0..size).map(|_| Vec::with_capacity(buffer_capacity)).collect(),
            size,
            buffer_capacity,
            fallbacks: 0,
        }
    }

    /// Take a buffer out of the pool, allocating when none is free.
    pub fn acquire(&mut self) -> Vec<f64> {
        match self.free.pop() {
            Some(buf) => buf,
            None => {
                self.fallbacks += 1;
                tracing::trace!(size = self.size, "Buffer pool exhausted");
                Vec::with_capacity(self.buffer_capacity)
            }
        }
    }

    /// Return a buffer. Buffers beyond the pool size are dropped.
    pub fn release(&mut self, mut buf: Vec<f64>) {
        if self.free.len() < self.size {
            buf.clear();
            self.free.push(buf);
        }
    }

    /// Run `f` with a cleared buffer and return it to the pool afterwards.
    pub fn with_buffer<T, E>(
        &mut self,
        f: impl FnOnce(&mut Vec<f64>) -> Result<T, E>,
    ) -> Result<T, E> {
        let mut buf = self.acquire();
        buf.clear();
        let result = f(&mut buf);
        self.release(buf);
        result
    }

    pub fn available(&self) -> usize {
        self.free.len()
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Calls that had to allocate because the pool was empty.
    pub fn fallbacks(&self) -> u64 {
        self.fallbacks
    }
}

impl Default for BufferPool {
    /// Four buffers sized for the 210 pairwise distances of one hand.
    fn default() -> Self {
        Self::new(4, 210)
    }
}
