/// Contract violations reported by the quantizer.
///
/// Legal inputs cannot fail: the algorithm performs no I/O and, allocation
/// aside, no internal operation of it can go wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The requested palette size was zero. Requests below one are rejected
    /// rather than clamped.
    #[error("maximum color count must be at least 1, got {0}")]
    InvalidMaxColors(usize),

    /// The sample buffer did not hold a whole number of RGBA samples.
    #[error("pixel buffer of {0} bytes is not a whole number of RGBA samples")]
    TruncatedPixelBuffer(usize),
}
