/// Indicator output aligned to its input price series.
///
/// `values[i]` belongs to input index `i + offset`.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    values: Vec<f64>,
    offset: usize,
}

impl IndicatorSeries {
    pub fn new(values: Vec<f64>, offset: usize) -> Self {
        Self { values, offset }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn last(&self) -> Option<f64> {
        self.values.last().copied()
    }

    /// Input index of the value at `index`
    pub fn price_index(&self, index: usize) -> usize {
        index + self.offset
    }

    /// Series index carrying the value for input index `price_index`
    pub fn index_of_price(&self, price_index: usize) -> Option<usize> {
        let index = price_index.checked_sub(self.offset)?;
        (index < self.values.len()).then_some(index)
    }

    /// Values up to and including the one aligned with `price_index`
    pub fn up_to_price(&self, price_index: usize) -> Option<&[f64]> {
        self.index_of_price(price_index)
            .map(|index| &self.values[..=index])
    }

    /// Re-expresses a series computed over another series' values in terms
    /// of that series' own input.
    pub(crate) fn shifted(self, by: usize) -> Self {
        Self {
            values: self.values,
            offset: self.offset + by,
        }
    }
}
