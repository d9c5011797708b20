//! Feature vectors.
//!
//! A vector is a fixed-length window of `f32` slots. The bin manager owns the
//! backing storage (usually an arena row, see [`crate::arena`]) and hands each
//! aggregator a view over its own slot range only. `NaN` is the "no data"
//! value and is stored as-is.

/// Read-only view over a run of feature slots.
#[derive(Debug, Clone, Copy)]
pub struct Vector<'a> {
    elements: &'a [f32],
}

impl<'a> Vector<'a> {
    pub fn new(elements: &'a [f32]) -> Self {
        Self { elements }
    }

    /// Number of slots.
    #[inline]
    pub fn size(&self) -> usize {
        self.elements.len()
    }

    /// Value at `index`. Panics if `index >= size()`.
    #[inline]
    pub fn get(&self, index: usize) -> f32 {
        self.elements[index]
    }

    /// Sub-view over `[offset, offset + len)`.
    pub fn range(&self, offset: usize, len: usize) -> Vector<'a> {
        Vector::new(&self.elements[offset..offset + len])
    }

    pub fn as_slice(&self) -> &'a [f32] {
        self.elements
    }
}

/// Writable view over a run of feature slots.
#[derive(Debug)]
pub struct VectorMut<'a> {
    elements: &'a mut [f32],
}

impl<'a> VectorMut<'a> {
    pub fn new(elements: &'a mut [f32]) -> Self {
        Self { elements }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.elements.len()
    }

    #[inline]
    pub fn get(&self, index: usize) -> f32 {
        self.elements[index]
    }

    #[inline]
    pub fn set(&mut self, index: usize, value: f32) {
        self.elements[index] = value;
    }

    /// Set every slot to `value`.
    pub fn fill(&mut self, value: f32) {
        self.elements.fill(value);
    }

    /// Writable sub-view over `[offset, offset + len)`.
    pub fn range_mut(&mut self, offset: usize, len: usize) -> VectorMut<'_> {
        VectorMut::new(&mut self.elements[offset..offset + len])
    }

    /// Reborrow as a read-only view.
    pub fn as_vector(&self) -> Vector<'_> {
        Vector::new(self.elements)
    }

    pub fn as_slice(&self) -> &[f32] {
        self.elements
    }
}

/// Owned feature vector, used where a bin's features outlive the arena
/// (spatial and temporal bins handed between phases, output records).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureVector {
    elements: Vec<f32>,
}

impl FeatureVector {
    /// Create a vector of `size` slots, all NaN.
    pub fn new(size: usize) -> Self {
        Self {
            elements: vec![f32::NAN; size],
        }
    }

    pub fn from_vec(elements: Vec<f32>) -> Self {
        Self { elements }
    }

    pub fn size(&self) -> usize {
        self.elements.len()
    }

    pub fn get(&self, index: usize) -> f32 {
        self.elements[index]
    }

    pub fn view(&self) -> Vector<'_> {
        Vector::new(&self.elements)
    }

    pub fn view_mut(&mut self) -> VectorMut<'_> {
        VectorMut::new(&mut self.elements)
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.elements
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.elements
    }
}
