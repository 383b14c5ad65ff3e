use std::num::NonZero;

use new_zealand::nz;

/// The largest torus dimensionality a host list can be configured for.
pub const MAX_DIMENSIONS: usize = 5;

const DEFAULT_MAX_RANGE: u64 = 64 * 1024;
const DEFAULT_MAX_RANGES: usize = 256 * 1024;
const DEFAULT_MAX_PREFIX_COUNT: u64 = 1024 * 1024;
const DEFAULT_CHUNK: NonZero<usize> = nz!(16);
const DEFAULT_MAX_HOSTNAME_LENGTH: usize = 256;

/// Dimensionality of the cluster's node naming scheme.
///
/// Plain clusters number their nodes with decimal suffixes (`node017`). Torus clusters encode
/// one base-36 digit per axis (`rack0AZ` is x=0, y=10, z=35 on a 3-D torus), which changes
/// how suffixes are decomposed, how `x` box items are parsed and how lists are rendered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Dimensions {
    /// Decimal numeric suffixes.
    #[default]
    OneD,

    /// Base-36 coordinate suffixes with the given number of axes (2 to [`MAX_DIMENSIONS`]).
    MultiD(u8),
}

impl Dimensions {
    /// Returns the dimensionality for an axis count, or `None` if the count is outside
    /// `1..=MAX_DIMENSIONS`.
    #[must_use]
    pub fn from_count(count: usize) -> Option<Self> {
        match count {
            1 => Some(Self::OneD),
            2..=MAX_DIMENSIONS => u8::try_from(count).ok().map(Self::MultiD),
            _ => None,
        }
    }

    /// Number of axes: 1 for plain clusters.
    #[must_use]
    pub fn count(self) -> usize {
        match self {
            Self::OneD => 1,
            Self::MultiD(n) => usize::from(n),
        }
    }

    /// Returns the axis count if the suffix `width` is a coordinate tuple in this
    /// dimensionality, i.e. the dimensionality is multi-dimensional and `width` equals it.
    #[must_use]
    pub(crate) fn coordinate_width(self, width: usize) -> Option<usize> {
        match self {
            Self::MultiD(n) if usize::from(n) == width => Some(width),
            _ => None,
        }
    }
}

/// Tunable limits and the naming scheme used when parsing and rendering host lists.
///
/// Every [`HostList`][crate::HostList] carries a copy of its configuration. Use
/// [`HostListConfig::builder()`] to customize it.
///
/// # Example
///
/// ```
/// use hostlist::{HostList, HostListConfig};
///
/// let config = HostListConfig::builder().dimensions(3).build();
/// let torus = HostList::parse_with_config("bg[000x011]", config).unwrap();
///
/// assert_eq!(torus.count(), 4);
/// assert_eq!(torus.ranged_string(), "bg[000x011]");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HostListConfig {
    dimensions: Dimensions,
    max_range: u64,
    max_ranges: usize,
    max_prefix_count: u64,
    chunk: NonZero<usize>,
    max_hostname_length: usize,
    factor_zero_padding: bool,
}

impl HostListConfig {
    /// Returns a builder that starts from the default configuration.
    #[cfg_attr(test, mutants::skip)] // Trivial forwarder to builder.
    pub fn builder() -> HostListConfigBuilder {
        HostListConfigBuilder::new()
    }

    /// The dimensionality of host name suffixes.
    #[must_use]
    #[inline]
    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    /// Upper bound on the number of hosts a single range item such as `0-99` may describe.
    #[must_use]
    #[inline]
    pub fn max_range(&self) -> u64 {
        self.max_range
    }

    /// Upper bound on the number of ranges produced from one bracket group.
    #[must_use]
    #[inline]
    pub fn max_ranges(&self) -> usize {
        self.max_ranges
    }

    /// Upper bound on the number of prefixes a bracketed prefix such as `a[0-9].b` may expand to.
    #[must_use]
    #[inline]
    pub fn max_prefix_count(&self) -> u64 {
        self.max_prefix_count
    }

    /// Initial capacity and minimum growth step of a list's range array.
    #[must_use]
    #[inline]
    pub fn chunk(&self) -> NonZero<usize> {
        self.chunk
    }

    /// Upper bound on the length of one host name produced by the parser.
    #[must_use]
    #[inline]
    pub fn max_hostname_length(&self) -> usize {
        self.max_hostname_length
    }

    /// Whether the renderer moves zero padding shared by a whole bracket group into the
    /// prefix, rendering `nid[00003-00007]` as `nid0000[3-7]`.
    #[must_use]
    #[inline]
    pub fn factor_zero_padding(&self) -> bool {
        self.factor_zero_padding
    }
}

impl Default for HostListConfig {
    fn default() -> Self {
        Self {
            dimensions: Dimensions::OneD,
            max_range: DEFAULT_MAX_RANGE,
            max_ranges: DEFAULT_MAX_RANGES,
            max_prefix_count: DEFAULT_MAX_PREFIX_COUNT,
            chunk: DEFAULT_CHUNK,
            max_hostname_length: DEFAULT_MAX_HOSTNAME_LENGTH,
            factor_zero_padding: false,
        }
    }
}

/// Builder for creating an instance of [`HostListConfig`].
///
/// All settings are optional; unset settings keep their defaults.
///
/// # Example
///
/// ```
/// use hostlist::HostListConfig;
///
/// let config = HostListConfig::builder()
///     .max_range(1024)
///     .factor_zero_padding(true)
///     .build();
///
/// assert_eq!(config.max_range(), 1024);
/// ```
#[derive(Debug)]
#[must_use]
pub struct HostListConfigBuilder {
    config: HostListConfig,
}

impl HostListConfigBuilder {
    #[inline]
    pub(crate) fn new() -> Self {
        Self {
            config: HostListConfig::default(),
        }
    }

    /// Sets the number of torus axes encoded in host name suffixes. 1 means plain decimal
    /// suffixes.
    ///
    /// # Panics
    ///
    /// Panics if `count` is zero or greater than [`MAX_DIMENSIONS`].
    pub fn dimensions(mut self, count: usize) -> Self {
        let dimensions = Dimensions::from_count(count);
        assert!(
            dimensions.is_some(),
            "host list dimensions must be in 1..={MAX_DIMENSIONS}, got {count}"
        );
        self.config.dimensions = dimensions.unwrap_or_default();
        self
    }

    /// Sets the maximum number of hosts a single range item may describe.
    ///
    /// # Panics
    ///
    /// Panics if `max_range` is zero.
    pub fn max_range(mut self, max_range: u64) -> Self {
        assert!(max_range > 0, "max_range must be non-zero");
        self.config.max_range = max_range;
        self
    }

    /// Sets the maximum number of ranges produced from one bracket group.
    ///
    /// # Panics
    ///
    /// Panics if `max_ranges` is zero.
    pub fn max_ranges(mut self, max_ranges: usize) -> Self {
        assert!(max_ranges > 0, "max_ranges must be non-zero");
        self.config.max_ranges = max_ranges;
        self
    }

    /// Sets the maximum number of prefixes a bracketed prefix may expand to.
    ///
    /// # Panics
    ///
    /// Panics if `max_prefix_count` is zero.
    pub fn max_prefix_count(mut self, max_prefix_count: u64) -> Self {
        assert!(max_prefix_count > 0, "max_prefix_count must be non-zero");
        self.config.max_prefix_count = max_prefix_count;
        self
    }

    /// Sets the initial capacity and minimum growth step of the range array.
    pub fn chunk(mut self, chunk: NonZero<usize>) -> Self {
        self.config.chunk = chunk;
        self
    }

    /// Sets the maximum length of a single host name produced by the parser.
    ///
    /// # Panics
    ///
    /// Panics if `max_hostname_length` is zero.
    pub fn max_hostname_length(mut self, max_hostname_length: usize) -> Self {
        assert!(
            max_hostname_length > 0,
            "max_hostname_length must be non-zero"
        );
        self.config.max_hostname_length = max_hostname_length;
        self
    }

    /// Enables or disables moving zero padding shared by a bracket group into the prefix.
    pub fn factor_zero_padding(mut self, enabled: bool) -> Self {
        self.config.factor_zero_padding = enabled;
        self
    }

    /// Builds the configuration.
    #[must_use]
    pub fn build(self) -> HostListConfig {
        self.config
    }
}
