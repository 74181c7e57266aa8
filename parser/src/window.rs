/// Overlapping fixed-size windows over a slice, in order.
///
/// A sequence of length `n` yields `n - size + 1` windows, or none when
/// `n < size`. A size of zero yields nothing. Clone the iterator before
/// consuming it to walk the same windows again.
#[derive(Debug)]
pub struct SlidingWindows<'a, T> {
    items: &'a [T],
    size: usize,
    start: usize,
}

pub fn sliding_windows<T>(items: &[T], size: usize) -> SlidingWindows<'_, T> {
    SlidingWindows {
        items,
        size,
        start: 0,
    }
}

impl<T> Clone for SlidingWindows<'_, T> {
    fn clone(&self) -> Self {
        Self {
            items: self.items,
            size: self.size,
            start: self.start,
        }
    }
}

impl<'a, T> SlidingWindows<'a, T> {
    pub fn window_size(&self) -> usize {
        self.size
    }
}

impl<'a, T> Iterator for SlidingWindows<'a, T> {
    type Item = &'a [T];

    fn next(&mut self) -> Option<Self::Item> {
        if self.size == 0 {
            return None;
        }
        let end = self.start + self.size;
        if end > self.items.len() {
            return None;
        }
        let window = &self.items[self.start..end];
        self.start += 1;
        Some(window)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let end = self.start + self.size;
        let remaining = if self.size == 0 {
            0
        } else {
            (self.items.len() + 1).saturating_sub(end)
        };
        (remaining, Some(remaining))
    }
}

impl<T> ExactSizeIterator for SlidingWindows<'_, T> {}

impl<T> std::iter::FusedIterator for SlidingWindows<'_, T> {}
