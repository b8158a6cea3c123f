//! Sample encodings and the arithmetic shared by every stage of the graph.
//!
//! Audio travels through the graph as [`Sample`] (`f32`, unclamped, so
//! intermediate signals may exceed ±1). The fixed-point and 64-bit float
//! encodings exist for the format boundary, where a device driver or a
//! decoder converts to or from the graph representation with [`convert`].
//!
//! # Conversion rules
//!
//! - Fixed point to fixed point is an exact shift between full-scale ranges
//!   (`i8 -> i16` is `<< 8`, `i32 -> i16` is `>> 16`).
//! - Fixed point to float divides positive values by `MAX` and negative
//!   values by `MAX + 1`, so both ends of the integer range map to ±1.
//! - Float to fixed point clamps at ±1 and uses the same asymmetric scale.
//!
//! # Mixing and scaling
//!
//! [`mix`] and [`scale`] saturate for every fixed-point encoding and leave
//! floating point values unclamped. [`SampleLanes`] is the vector-width
//! variant used by block kernels such as [`mix_into`].

use core::fmt;

/// The in-graph sample representation.
pub type Sample = f32;

/// Number of samples processed together by [`SampleLanes`].
pub const LANES: usize = 4;

/// Describes a sample encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleFormat {
    /// Signed 8-bit integer.
    I8,
    /// Signed 16-bit integer.
    I16,
    /// Signed 24-bit integer, packed into three bytes.
    I24,
    /// Signed 32-bit integer.
    I32,
    /// Signed 64-bit integer.
    I64,
    /// 32-bit IEEE float.
    F32,
    /// 64-bit IEEE float.
    F64,
}

impl SampleFormat {
    /// Storage size of one sample in bytes.
    pub const fn size_in_bytes(self) -> usize {
        match self {
            Self::I8 => 1,
            Self::I16 => 2,
            Self::I24 => 3,
            Self::I32 | Self::F32 => 4,
            Self::I64 | Self::F64 => 8,
        }
    }

    /// Returns true for the fixed-point encodings.
    pub const fn is_integer(self) -> bool {
        !self.is_float()
    }

    /// Returns true for the floating point encodings.
    pub const fn is_float(self) -> bool {
        matches!(self, Self::F32 | Self::F64)
    }

    /// Short lowercase name, e.g. `"i24"`.
    pub const fn name(self) -> &'static str {
        match self {
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I24 => "i24",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::F32 => "f32",
            Self::F64 => "f64",
        }
    }
}

impl fmt::Display for SampleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A signed 24-bit sample stored as three little-endian bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct I24([u8; 3]);

impl I24 {
    /// Smallest representable value, `-2^23`.
    pub const MIN: I24 = I24::new(-8_388_608);
    /// Largest representable value, `2^23 - 1`.
    pub const MAX: I24 = I24::new(8_388_607);

    /// Creates a sample from the low 24 bits of `value`.
    pub const fn new(value: i32) -> Self {
        let bytes = value.to_le_bytes();
        Self([bytes[0], bytes[1], bytes[2]])
    }

    /// Returns the sign-extended value.
    pub const fn get(self) -> i32 {
        i32::from_le_bytes([self.0[0], self.0[1], self.0[2], 0]) << 8 >> 8
    }

    /// Creates a sample from its little-endian byte representation.
    pub const fn from_le_bytes(bytes: [u8; 3]) -> Self {
        Self(bytes)
    }

    /// Returns the little-endian byte representation.
    pub const fn to_le_bytes(self) -> [u8; 3] {
        self.0
    }

    fn saturating(value: i64) -> Self {
        Self::new(value.clamp(Self::MIN.get() as i64, Self::MAX.get() as i64) as i32)
    }
}

impl From<I24> for i32 {
    fn from(sample: I24) -> Self {
        sample.get()
    }
}

/// Encoding-independent view of a sample used by [`convert`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FullScale {
    /// A fixed-point value with its width in bits.
    Fixed {
        /// The native integer value.
        value: i64,
        /// Width of the native integer type.
        bits: u32,
    },
    /// A floating point value where ±1 is full scale.
    Float(f64),
}

/// A sample encoding supported by [`convert`], [`mix`] and [`scale`].
pub trait SampleValue: Copy + Default + PartialEq + fmt::Debug + Send + Sync + 'static {
    /// The encoding descriptor for this type.
    const FORMAT: SampleFormat;

    /// Returns the encoding-independent view of this sample.
    fn to_full_scale(self) -> FullScale;

    /// Builds a sample of this type from an encoding-independent view.
    fn from_full_scale(level: FullScale) -> Self;

    /// Adds two samples, saturating for fixed-point types.
    fn mix(self, other: Self) -> Self;

    /// Multiplies by `gain`, saturating for fixed-point types.
    fn scale(self, gain: f32) -> Self;
}

/// Converts a sample from one encoding to another.
///
/// # Example
///
/// ```rust
/// use auralis_core::convert;
///
/// assert_eq!(convert::<i16, _>(1.0_f32), i16::MAX);
/// assert_eq!(convert::<i16, _>(-1.0_f32), i16::MIN);
/// assert_eq!(convert::<i16, _>(0x12_i8), 0x1200);
/// ```
#[inline]
pub fn convert<T: SampleValue, S: SampleValue>(sample: S) -> T {
    T::from_full_scale(sample.to_full_scale())
}

/// Adds two samples, saturating for fixed-point types.
#[inline]
pub fn mix<S: SampleValue>(a: S, b: S) -> S {
    a.mix(b)
}

/// Multiplies a sample by `gain`, saturating for fixed-point types.
#[inline]
pub fn scale<S: SampleValue>(sample: S, gain: f32) -> S {
    sample.scale(gain)
}

const fn fixed_max(bits: u32) -> i64 {
    ((1_u64 << (bits - 1)) - 1) as i64
}

fn rescale_fixed(value: i64, from_bits: u32, to_bits: u32) -> i64 {
    if to_bits >= from_bits {
        value << (to_bits - from_bits)
    } else {
        value >> (from_bits - to_bits)
    }
}

fn fixed_to_float(value: i64, bits: u32) -> f64 {
    let max = fixed_max(bits) as f64;
    if value > 0 {
        value as f64 / max
    } else {
        value as f64 / (max + 1.0)
    }
}

fn float_to_fixed(value: f64, bits: u32) -> i64 {
    let max = fixed_max(bits);
    if value >= 1.0 {
        max
    } else if value <= -1.0 {
        -max - 1
    } else if value > 0.0 {
        (value * max as f64) as i64
    } else {
        (value * (max as f64 + 1.0)) as i64
    }
}

fn fixed_from_full_scale(level: FullScale, bits: u32) -> i64 {
    match level {
        FullScale::Fixed { value, bits: from } => rescale_fixed(value, from, bits),
        FullScale::Float(value) => float_to_fixed(value, bits),
    }
}

fn float_from_full_scale(level: FullScale) -> f64 {
    match level {
        FullScale::Fixed { value, bits } => fixed_to_float(value, bits),
        FullScale::Float(value) => value,
    }
}

macro_rules! fixed_sample {
    ($ty:ty, $format:ident) => {
        impl SampleValue for $ty {
            const FORMAT: SampleFormat = SampleFormat::$format;

            #[inline]
            fn to_full_scale(self) -> FullScale {
                FullScale::Fixed {
                    value: self as i64,
                    bits: <$ty>::BITS,
                }
            }

            #[inline]
            fn from_full_scale(level: FullScale) -> Self {
                fixed_from_full_scale(level, <$ty>::BITS) as $ty
            }

            #[inline]
            fn mix(self, other: Self) -> Self {
                self.saturating_add(other)
            }

            #[inline]
            fn scale(self, gain: f32) -> Self {
                // float-to-int `as` saturates at the type bounds
                (self as f64 * gain as f64) as $ty
            }
        }
    };
}

fixed_sample!(i8, I8);
fixed_sample!(i16, I16);
fixed_sample!(i32, I32);
fixed_sample!(i64, I64);

impl SampleValue for I24 {
    const FORMAT: SampleFormat = SampleFormat::I24;

    #[inline]
    fn to_full_scale(self) -> FullScale {
        FullScale::Fixed {
            value: self.get() as i64,
            bits: 24,
        }
    }

    #[inline]
    fn from_full_scale(level: FullScale) -> Self {
        Self::new(fixed_from_full_scale(level, 24) as i32)
    }

    #[inline]
    fn mix(self, other: Self) -> Self {
        Self::saturating(self.get() as i64 + other.get() as i64)
    }

    #[inline]
    fn scale(self, gain: f32) -> Self {
        Self::saturating((self.get() as f64 * gain as f64) as i64)
    }
}

impl SampleValue for f32 {
    const FORMAT: SampleFormat = SampleFormat::F32;

    #[inline]
    fn to_full_scale(self) -> FullScale {
        FullScale::Float(self as f64)
    }

    #[inline]
    fn from_full_scale(level: FullScale) -> Self {
        float_from_full_scale(level) as f32
    }

    #[inline]
    fn mix(self, other: Self) -> Self {
        self + other
    }

    #[inline]
    fn scale(self, gain: f32) -> Self {
        self * gain
    }
}

impl SampleValue for f64 {
    const FORMAT: SampleFormat = SampleFormat::F64;

    #[inline]
    fn to_full_scale(self) -> FullScale {
        FullScale::Float(self)
    }

    #[inline]
    fn from_full_scale(level: FullScale) -> Self {
        float_from_full_scale(level)
    }

    #[inline]
    fn mix(self, other: Self) -> Self {
        self + other
    }

    #[inline]
    fn scale(self, gain: f32) -> Self {
        self * gain as f64
    }
}

/// [`LANES`] graph samples processed as one unit.
///
/// The fixed width lets the compiler keep the lanes in one vector register;
/// block kernels walk their slices in `LANES`-sized chunks and finish the
/// tail with the scalar operations.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SampleLanes([Sample; LANES]);

impl SampleLanes {
    /// All lanes set to `value`.
    pub const fn splat(value: Sample) -> Self {
        Self([value; LANES])
    }

    /// Creates lanes from an array.
    pub const fn from_array(lanes: [Sample; LANES]) -> Self {
        Self(lanes)
    }

    /// Returns the lanes as an array.
    pub const fn to_array(self) -> [Sample; LANES] {
        self.0
    }

    /// Loads the first `LANES` samples of `src`.
    ///
    /// Panics if `src` is shorter than `LANES`.
    #[inline]
    pub fn load(src: &[Sample]) -> Self {
        let mut lanes = [0.0; LANES];
        lanes.copy_from_slice(&src[..LANES]);
        Self(lanes)
    }

    /// Stores the lanes into the first `LANES` samples of `dst`.
    ///
    /// Panics if `dst` is shorter than `LANES`.
    #[inline]
    pub fn store(self, dst: &mut [Sample]) {
        dst[..LANES].copy_from_slice(&self.0);
    }

    /// Lane-wise [`mix`].
    #[inline]
    pub fn mix(self, other: Self) -> Self {
        Self(core::array::from_fn(|i| self.0[i] + other.0[i]))
    }

    /// Lane-wise [`scale`].
    #[inline]
    pub fn scale(self, gain: Sample) -> Self {
        Self(self.0.map(|s| s * gain))
    }
}

/// Adds `src` into `dst` over the common length of both slices.
#[inline]
pub fn mix_into(dst: &mut [Sample], src: &[Sample]) {
    let len = dst.len().min(src.len());
    let mut dst_chunks = dst[..len].chunks_exact_mut(LANES);
    let mut src_chunks = src[..len].chunks_exact(LANES);

    for (d, s) in (&mut dst_chunks).zip(&mut src_chunks) {
        SampleLanes::load(d).mix(SampleLanes::load(s)).store(d);
    }

    for (d, &s) in dst_chunks
        .into_remainder()
        .iter_mut()
        .zip(src_chunks.remainder())
    {
        *d = mix(*d, s);
    }
}

/// Multiplies every sample of `buffer` by `gain`.
#[inline]
pub fn scale_in_place(buffer: &mut [Sample], gain: Sample) {
    let mut chunks = buffer.chunks_exact_mut(LANES);

    for chunk in &mut chunks {
        SampleLanes::load(chunk).scale(gain).store(chunk);
    }

    for s in chunks.into_remainder() {
        *s = scale(*s, gain);
    }
}
