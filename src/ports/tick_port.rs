//! Raw tick source port trait.

use crate::domain::error::BarcrossError;
use crate::domain::tick::Tick;

pub trait TickPort: Send + Sync {
    /// Every partition for `instrument`, concatenated. Order within the
    /// result is unspecified; callers sort.
    ///
    /// Fails with `DataNotFound` when no partition exists.
    fn load_ticks(&self, instrument: &str) -> Result<Vec<Tick>, BarcrossError>;

    fn list_instruments(&self) -> Result<Vec<String>, BarcrossError>;
}
