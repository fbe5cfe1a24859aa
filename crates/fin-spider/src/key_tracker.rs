use crate::http::*;
use bimap::BiMap;
use num::PrimInt;
use std::hash::Hash;
use std::ops::AddAssign;
use tokio_postgres::types::{FromSql, ToSql};

/// Data structure for tracking used Primary Keys, and providing the next available one.
///
/// The core structure is a Bijective Mapping, [BiMap];
///     - on the left, a Primary Key, `PK`, of some integer type (i8, i16, i32, etc.), that is also
///     compatible with [Postgres Types];
///     - on the right, an `Obj`: some hashable value, such as a line item name.
///
/// Alongside it is `next_key`; the lowest unused value of type `PK`.
///
/// [BiMap]: bimap::BiMap,
/// [Postgres Types]: tokio_postgres::types::FromSql,
///
/// ## Example
/// ```rust
/// use bimap::BiMap;
/// use fin_spider::key_tracker::KeyTracker;
///
/// let mut bimap: BiMap<i32, String> = BiMap::new();
/// bimap.insert(0, "Sales/Revenue".to_string());
/// bimap.insert(1, "Gross Income".to_string());
/// bimap.insert(3, "Net Income".to_string());
///
/// let tracker = KeyTracker::from(bimap);
/// assert_eq!(tracker.see_next_key(), &2);
/// ```
#[derive(Debug)]
pub struct KeyTracker<PK, Obj>
where
    PK: Eq + Hash + PrimInt + AddAssign,
    Obj: Eq + Hash,
{
    pub bimap: BiMap<PK, Obj>,
    pub next_key: PK,
}

impl<PK, Obj> KeyTracker<PK, Obj>
where
    PK: Eq + Hash + PrimInt + AddAssign,
    Obj: Eq + Hash,
{
    /// Turn a BiMap into a `KeyTracker`.
    pub fn from(bimap: BiMap<PK, Obj>) -> Self {
        let starting_key = Self::calc_lowest_key(&bimap);
        Self {
            bimap,
            next_key: starting_key,
        }
    }

    /// Finds the lowest available key, starting from 0.
    pub fn calc_lowest_key(map: &BiMap<PK, Obj>) -> PK {
        let mut next_key = PK::zero();
        while map.contains_left(&next_key) {
            next_key += PK::one();
        }
        next_key
    }

    /// Set the next available key.
    pub fn calc_next_key(&mut self) {
        while self.bimap.contains_left(&self.next_key) {
            self.next_key += PK::one();
        }
    }

    pub fn see_next_key(&self) -> &PK {
        &self.next_key
    }

    pub fn key_of(&self, value: &Obj) -> Option<PK> {
        self.bimap.get_by_right(value).copied()
    }

    /// Search the BiMap for an existing value;
    ///     - if it does exist, return the associated key.
    ///     - if it doesn't exist, insert the Value with the `next_key`, returning that key.
    ///
    /// The flag is `true` when the value was new.
    ///
    /// ```rust
    /// use bimap::BiMap;
    /// use fin_spider::key_tracker::KeyTracker;
    ///
    /// let mut bimap: BiMap<i32, String> = BiMap::new();
    /// bimap.insert(0, "Sales/Revenue".to_string());
    /// bimap.insert(1, "Gross Income".to_string());
    /// bimap.insert(3, "Net Income".to_string());
    ///
    /// let mut tracker = KeyTracker::from(bimap);
    ///
    /// // insert a new value
    /// assert_eq!(tracker.transact("EBITDA".to_string()), (2, true));
    /// assert_eq!(tracker.see_next_key(), &4); // next key recalculates
    ///
    /// // an existing value keeps its key
    /// assert_eq!(tracker.transact("Net Income".to_string()), (3, false));
    /// ```
    pub fn transact(&mut self, value: Obj) -> (PK, bool) {
        if let Some(key) = self.bimap.get_by_right(&value) {
            return (*key, false);
        }
        let key = self.next_key;
        self.bimap.insert(key, value);
        self.calc_next_key();
        (key, true)
    }
}

impl<PK, Obj> KeyTracker<PK, Obj>
where
    PK: Eq + Hash + PrimInt + AddAssign + for<'a> FromSql<'a> + ToSql + Sync,
    Obj: Eq + Hash + for<'a> FromSql<'a> + ToSql + Sync,
{
    /// Retrieve a KeyTracker from a PostgreSQL query returning `(key, value)` rows.
    pub async fn pg_fetch(pg_client: &PgClient, stmt: &str) -> Result<Self, tokio_postgres::Error> {
        let bimap: BiMap<PK, Obj> = pg_client
            .query(stmt, &[])
            .await?
            .into_iter()
            .map(|row| (row.get(0), row.get(1)))
            .collect();

        Ok(Self::from(bimap))
    }
}

//////////////////////////////////////////////////////////////
// -- TESTS --
//////////////////////////////////////////////////////////////
