//! relation.rs
//! Finitary relations on an initial section of the naturals, with Boolean algebra.

use crate::error::{DnnError, Result};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::btree_set;
use std::collections::BTreeSet;
use std::fmt;
use std::ops::{BitAnd, BitOr, BitXor, Not, Sub};

/// A member of a relation. Elements are drawn from `0..universe_size`.
pub type Tuple = SmallVec<[usize; 4]>;

/// A finite relation: a subset of `{0, .., universe_size - 1}^arity`.
///
/// Structural equality and hashing cover `(tuples, universe_size, arity)`, so two
/// relations are interchangeable as map keys exactly when all three agree. The
/// algebra and the `is_*` comparisons are stricter: they refuse to combine
/// relations over different universes or arities.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawRelation")]
pub struct Relation {
    tuples: BTreeSet<Tuple>,
    universe_size: usize,
    arity: usize,
}

/// Wire form of a relation, checked by `Relation::new` before use.
#[derive(Deserialize)]
struct RawRelation {
    tuples: Vec<Vec<usize>>,
    universe_size: usize,
    arity: usize,
}

impl TryFrom<RawRelation> for Relation {
    type Error = DnnError;

    fn try_from(raw: RawRelation) -> Result<Self> {
        Relation::new(raw.tuples, raw.universe_size, raw.arity)
    }
}

impl Relation {
    /// Builds a relation of an explicit arity. Duplicate tuples are ignored.
    pub fn new<I, T>(tuples: I, universe_size: usize, arity: usize) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[usize]>,
    {
        let mut set = BTreeSet::new();
        for tup in tuples {
            let tup = tup.as_ref();
            if tup.len() != arity {
                return Err(DnnError::arity("relation tuple", arity, tup.len()));
            }
            if let Some(&element) = tup.iter().find(|&&e| e >= universe_size) {
                return Err(DnnError::ElementOutOfUniverse { element, universe_size });
            }
            set.insert(Tuple::from_slice(tup));
        }
        Ok(Self { tuples: set, universe_size, arity })
    }

    /// Builds a relation whose arity is taken from its first tuple.
    pub fn infer<I, T>(tuples: I, universe_size: usize) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[usize]>,
    {
        let mut iter = tuples.into_iter().peekable();
        let arity = match iter.peek() {
            Some(first) => first.as_ref().len(),
            None => return Err(DnnError::EmptyRelationArity),
        };
        Self::new(iter, universe_size, arity)
    }

    pub fn empty(universe_size: usize, arity: usize) -> Self {
        Self { tuples: BTreeSet::new(), universe_size, arity }
    }

    /// The full Cartesian power. Costs `O(universe_size^arity)`.
    pub fn full(universe_size: usize, arity: usize) -> Self {
        let tuples = CartesianPower::new(universe_size, arity).collect();
        Self { tuples, universe_size, arity }
    }

    pub fn tuples(&self) -> &BTreeSet<Tuple> { &self.tuples }
    pub fn universe_size(&self) -> usize { self.universe_size }
    pub fn arity(&self) -> usize { self.arity }
    pub fn len(&self) -> usize { self.tuples.len() }
    pub fn is_empty(&self) -> bool { self.tuples.is_empty() }

    pub fn contains(&self, tup: &[usize]) -> bool {
        self.tuples.contains(tup)
    }

    pub fn iter(&self) -> btree_set::Iter<'_, Tuple> {
        self.tuples.iter()
    }

    /// Lists the members, one per line.
    pub fn show(&self) -> String {
        self.tuples
            .iter()
            .map(|t| format!("{:?}", t.as_slice()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Returns true when `other` lives over the same universe with the same arity.
    pub fn is_comparable(&self, other: &Relation) -> bool {
        self.universe_size == other.universe_size && self.arity == other.arity
    }

    fn check_comparable(&self, other: &Relation) -> Result<()> {
        if self.is_comparable(other) {
            Ok(())
        } else {
            Err(DnnError::UniverseMismatch {
                left_universe: self.universe_size,
                left_arity: self.arity,
                right_universe: other.universe_size,
                right_arity: other.arity,
            })
        }
    }

    fn with_tuples(&self, tuples: BTreeSet<Tuple>) -> Self {
        Self { tuples, universe_size: self.universe_size, arity: self.arity }
    }

    // --- Boolean algebra ---

    /// Every tuple of the Cartesian power that is not in `self`.
    ///
    /// Enumerates all `universe_size^arity` tuples, so this is expensive for
    /// large universes or arities.
    pub fn complement(&self) -> Self {
        let tuples = CartesianPower::new(self.universe_size, self.arity)
            .filter(|t| !self.tuples.contains(t))
            .collect();
        self.with_tuples(tuples)
    }

    pub fn intersection(&self, other: &Relation) -> Result<Self> {
        self.check_comparable(other)?;
        Ok(self.with_tuples(self.tuples.intersection(&other.tuples).cloned().collect()))
    }

    pub fn union(&self, other: &Relation) -> Result<Self> {
        self.check_comparable(other)?;
        Ok(self.with_tuples(self.tuples.union(&other.tuples).cloned().collect()))
    }

    pub fn difference(&self, other: &Relation) -> Result<Self> {
        self.check_comparable(other)?;
        Ok(self.with_tuples(self.tuples.difference(&other.tuples).cloned().collect()))
    }

    pub fn symmetric_difference(&self, other: &Relation) -> Result<Self> {
        self.check_comparable(other)?;
        Ok(self.with_tuples(self.tuples.symmetric_difference(&other.tuples).cloned().collect()))
    }

    // --- Comparisons ---

    pub fn checked_eq(&self, other: &Relation) -> Result<bool> {
        self.check_comparable(other)?;
        Ok(self.tuples == other.tuples)
    }

    pub fn is_subset(&self, other: &Relation) -> Result<bool> {
        self.check_comparable(other)?;
        Ok(self.tuples.is_subset(&other.tuples))
    }

    pub fn is_proper_subset(&self, other: &Relation) -> Result<bool> {
        self.check_comparable(other)?;
        Ok(self.tuples.len() < other.tuples.len() && self.tuples.is_subset(&other.tuples))
    }

    pub fn is_superset(&self, other: &Relation) -> Result<bool> {
        other.is_subset(self)
    }

    pub fn is_proper_superset(&self, other: &Relation) -> Result<bool> {
        other.is_proper_subset(self)
    }

    /// Dot product over GF(2): the parity of the size of the intersection.
    pub fn dot(&self, other: &Relation) -> Result<u8> {
        self.check_comparable(other)?;
        let shared = self.tuples.intersection(&other.tuples).count();
        Ok((shared % 2) as u8)
    }
}

impl Not for &Relation {
    type Output = Relation;
    fn not(self) -> Relation { self.complement() }
}

impl Not for Relation {
    type Output = Relation;
    fn not(self) -> Relation { self.complement() }
}

// Set operators on references. Each fails like its named counterpart when the
// operands are not comparable.

impl BitAnd for &Relation {
    type Output = Result<Relation>;
    fn bitand(self, other: Self) -> Result<Relation> { self.intersection(other) }
}

impl BitOr for &Relation {
    type Output = Result<Relation>;
    fn bitor(self, other: Self) -> Result<Relation> { self.union(other) }
}

impl Sub for &Relation {
    type Output = Result<Relation>;
    fn sub(self, other: Self) -> Result<Relation> { self.difference(other) }
}

impl BitXor for &Relation {
    type Output = Result<Relation>;
    fn bitxor(self, other: Self) -> Result<Relation> { self.symmetric_difference(other) }
}

impl<'a> IntoIterator for &'a Relation {
    type Item = &'a Tuple;
    type IntoIter = btree_set::Iter<'a, Tuple>;
    fn into_iter(self) -> Self::IntoIter { self.tuples.iter() }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let universe = if self.universe_size > 10 {
            format!("{{0,...,{}}}", self.universe_size - 1)
        } else {
            let elements: Vec<String> = (0..self.universe_size).map(|e| e.to_string()).collect();
            format!("{{{}}}", elements.join(","))
        };
        let plural = if self.len() == 1 { "" } else { "s" };
        write!(
            f,
            "A relation on {} of arity {} containing {} tuple{}",
            universe,
            self.arity,
            self.len(),
            plural
        )
    }
}

/// Odometer over `{0, .., base - 1}^width` in lexicographic order.
struct CartesianPower {
    base: usize,
    current: Option<Tuple>,
}

impl CartesianPower {
    fn new(base: usize, width: usize) -> Self {
        // The empty power has exactly one (empty) tuple; a zero base with positive width has none.
        let current = if base == 0 && width > 0 { None } else { Some(smallvec::smallvec![0; width]) };
        Self { base, current }
    }
}

impl Iterator for CartesianPower {
    type Item = Tuple;

    fn next(&mut self) -> Option<Tuple> {
        let out = self.current.take()?;
        let mut next = out.clone();
        let mut carried = true;
        for digit in next.iter_mut().rev() {
            *digit += 1;
            if *digit < self.base {
                carried = false;
                break;
            }
            *digit = 0;
        }
        if !carried {
            self.current = Some(next);
        }
        Some(out)
    }
}
