//! Bar artifact cache port trait.

use crate::domain::error::BarcrossError;
use crate::domain::ohlcv::Bar;
use crate::domain::session::BarKey;

pub trait BarCachePort: Send + Sync {
    /// `Ok(None)` on a miss.
    fn load(&self, key: &BarKey) -> Result<Option<Vec<Bar>>, BarcrossError>;

    /// Publish bars under `key`. A failed store must leave no artifact
    /// visible under the key.
    fn store(&self, key: &BarKey, bars: &[Bar]) -> Result<(), BarcrossError>;
}
