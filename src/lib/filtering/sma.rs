use num_traits::{Num, NumAssignOps, NumCast};

// Moving average over the last SIZE samples. Before the window fills up the
// average covers only the samples seen so far.
pub struct SmaFilter<ItemT, const SIZE: usize> {
    buff: [ItemT; SIZE],
    idx: usize,
    len: usize,
    sum: ItemT,
}

impl<ItemT, const SIZE: usize> SmaFilter<ItemT, SIZE>
where
    ItemT: Num + NumAssignOps + NumCast + core::marker::Copy,
{
    pub fn new() -> SmaFilter<ItemT, SIZE> {
        SmaFilter::default()
    }

    pub fn reset(&mut self) {
        *self = SmaFilter::default();
    }

    pub fn insert(&mut self, data: ItemT) {
        if SIZE == 0 {
            return;
        }
        if self.len == SIZE {
            self.sum -= self.buff[self.idx];
        } else {
            self.len += 1;
        }
        self.sum += data;
        self.buff[self.idx] = data;
        self.idx = (self.idx + 1) % SIZE;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_full(&self) -> bool {
        self.len == SIZE
    }

    pub fn filtered(&self) -> Option<ItemT> {
        if self.len == 0 {
            return None;
        }
        Some(self.sum / ItemT::from(self.len)?)
    }
}

impl<ItemT, const SIZE: usize> Default for SmaFilter<ItemT, SIZE>
where
    ItemT: Num + NumAssignOps + NumCast + core::marker::Copy,
{
    fn default() -> SmaFilter<ItemT, SIZE> {
        SmaFilter {
            buff: [ItemT::zero(); SIZE],
            idx: 0,
            len: 0,
            sum: ItemT::zero(),
        }
    }
}
