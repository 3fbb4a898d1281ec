//! operation.rs
//! Memoized finitary operations, used as neuron activation functions.

use crate::error::{DnnError, Result};
use smallvec::SmallVec;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::rc::Rc;

/// An argument tuple. Most activations are unary or binary, so short tuples stay inline.
pub type Args<V> = SmallVec<[V; 4]>;

type Func<V> = dyn Fn(&[V]) -> Result<V>;

/// The computation carried by an operation.
pub enum Kernel<V> {
    /// A nullary operation. Evaluates to the stored value whatever the arguments.
    Constant(V),
    /// An operation of positive arity.
    Function { arity: usize, func: Box<Func<V>> },
}

struct Inner<V> {
    kernel: Kernel<V>,
    /// Append-only memo table. `None` when caching is disabled.
    cache: Option<RefCell<HashMap<Args<V>, V>>>,
}

/// A finitary operation on some universe of values `V`.
///
/// Operations do not carry a reference to their universe. Cloning is cheap and
/// shares both the kernel and the memo table, so a clone handed back by a
/// neighbor function is the same operation, cache included.
///
/// The memo table is unbounded and never invalidated. It lives behind a
/// `RefCell`, which keeps `Operation` on a single thread.
pub struct Operation<V> {
    inner: Rc<Inner<V>>,
}

impl<V> Clone for Operation<V> {
    fn clone(&self) -> Self {
        Self { inner: Rc::clone(&self.inner) }
    }
}

impl<V> fmt::Debug for Operation<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.inner.kernel {
            Kernel::Constant(_) => "Constant",
            Kernel::Function { .. } => "Function",
        };
        f.debug_struct("Operation")
            .field("kind", &kind)
            .field("arity", &self.arity())
            .field("cached", &self.is_cached())
            .finish()
    }
}

impl<V> Operation<V>
where
    V: Clone + Eq + Hash + 'static,
{
    /// Creates an operation of positive arity from a function of the argument slice.
    pub fn new<F>(arity: usize, func: F, cache_enabled: bool) -> Result<Self>
    where
        F: Fn(&[V]) -> V + 'static,
    {
        if arity == 0 {
            return Err(DnnError::arity("function operation (use Operation::constant)", 1, 0));
        }
        Ok(Self::from_fallible(arity, move |x| Ok(func(x)), cache_enabled))
    }

    fn from_fallible<F>(arity: usize, func: F, cache_enabled: bool) -> Self
    where
        F: Fn(&[V]) -> Result<V> + 'static,
    {
        Self::from_kernel(Kernel::Function { arity, func: Box::new(func) }, cache_enabled)
    }

    /// A nullary operation holding `value`.
    pub fn constant(value: V) -> Self {
        Self::from_kernel(Kernel::Constant(value), true)
    }

    /// An operation of positive arity which ignores its arguments.
    pub fn constant_function(value: V, arity: usize) -> Result<Self> {
        Self::new(arity, move |_| value.clone(), false)
    }

    pub fn identity() -> Self {
        Self::from_fallible(1, |x| Ok(x[0].clone()), false)
    }

    /// The `arity`-ary operation returning its argument at `coordinate`.
    pub fn projection(arity: usize, coordinate: usize) -> Result<Self> {
        if coordinate >= arity {
            return Err(DnnError::arity("projection coordinate", arity, coordinate + 1));
        }
        Self::new(arity, move |x| x[coordinate].clone(), false)
    }

    fn from_kernel(kernel: Kernel<V>, cache_enabled: bool) -> Self {
        let cache = cache_enabled.then(|| RefCell::new(HashMap::new()));
        Self { inner: Rc::new(Inner { kernel, cache }) }
    }

    /// Number of memoized argument tuples.
    pub fn cache_len(&self) -> usize {
        self.inner.cache.as_ref().map_or(0, |c| c.borrow().len())
    }

    /// Applies the operation to `args`.
    pub fn evaluate(&self, args: &[V]) -> Result<V> {
        let (arity, func) = match &self.inner.kernel {
            Kernel::Constant(value) => return Ok(value.clone()),
            Kernel::Function { arity, func } => (*arity, func),
        };
        if args.len() != arity {
            return Err(DnnError::arity("operation arguments", arity, args.len()));
        }

        let Some(cache) = &self.inner.cache else {
            return func(args);
        };
        if let Some(hit) = cache.borrow().get(args) {
            return Ok(hit.clone());
        }
        // The borrow is released before calling out, so a kernel may itself evaluate other operations.
        let value = func(args)?;
        cache.borrow_mut().entry(args.iter().cloned().collect()).or_insert_with(|| value.clone());
        Ok(value)
    }

    /// Forms the generalized composite `self[subs]`, with
    /// `self[g_1, .., g_k](x) = self(g_1(x), .., g_k(x))`.
    ///
    /// `subs` must have `self.arity()` entries, all of one arity `n`. The result
    /// has arity `n` and caching disabled, relying on the constituents' caches.
    /// When `n == 0` the composite is evaluated right away and returned as a constant.
    pub fn compose(&self, subs: &[Operation<V>]) -> Result<Self> {
        if subs.len() != self.arity() {
            return Err(DnnError::arity("composition operand count", self.arity(), subs.len()));
        }
        let new_arity = match subs.first() {
            Some(first) => first.arity(),
            None => 0,
        };
        if let Some(odd) = subs.iter().find(|op| op.arity() != new_arity) {
            return Err(DnnError::arity("composition operand arity", new_arity, odd.arity()));
        }

        if new_arity == 0 {
            let values = subs.iter().map(|op| op.evaluate(&[])).collect::<Result<Args<V>>>()?;
            return Ok(Self::constant(self.evaluate(&values)?));
        }

        let outer = self.clone();
        let inner: Vec<Operation<V>> = subs.to_vec();
        let composite = move |x: &[V]| -> Result<V> {
            let values = inner.iter().map(|op| op.evaluate(x)).collect::<Result<Args<V>>>()?;
            outer.evaluate(&values)
        };
        Ok(Self::from_fallible(new_arity, composite, false))
    }
}

impl<V> Operation<V> {
    pub fn kernel(&self) -> &Kernel<V> { &self.inner.kernel }

    pub fn arity(&self) -> usize {
        match &self.inner.kernel {
            Kernel::Constant(_) => 0,
            Kernel::Function { arity, .. } => *arity,
        }
    }

    pub fn is_cached(&self) -> bool { self.inner.cache.is_some() }

    /// Whether `self` and `other` are handles to the same operation.
    pub fn ptr_eq(&self, other: &Operation<V>) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::cell::Cell;

    fn add_mod(order: u32) -> Operation<u32> {
        Operation::new(2, move |x: &[u32]| (x[0] + x[1]) % order, false).unwrap()
    }

    #[rstest]
    #[case(true, 1)]
    #[case(false, 2)]
    fn test_cache_controls_recomputation(#[case] cached: bool, #[case] expected_calls: usize) {
        let calls = Rc::new(Cell::new(0usize));
        let counter = Rc::clone(&calls);
        let op = Operation::new(
            2,
            move |x: &[u32]| {
                counter.set(counter.get() + 1);
                x[0] * 10 + x[1]
            },
            cached,
        )
        .unwrap();

        assert_eq!(op.evaluate(&[1, 2]).unwrap(), 12);
        assert_eq!(op.evaluate(&[1, 2]).unwrap(), 12);
        assert_eq!(calls.get(), expected_calls);
        assert_eq!(op.cache_len(), usize::from(cached));
    }

    #[test]
    fn test_cache_holds_values_without_copy() {
        let join = Operation::new(2, |x: &[String]| format!("{}{}", x[0], x[1]), true).unwrap();
        let args = ["ab".to_string(), "c".to_string()];
        assert_eq!(join.evaluate(&args).unwrap(), "abc");
        assert_eq!(join.evaluate(&args).unwrap(), "abc");
        assert_eq!(join.cache_len(), 1);
    }

    #[test]
    fn test_clones_share_the_cache() {
        let op = Operation::new(1, |x: &[u32]| x[0] + 1, true).unwrap();
        let handle = op.clone();
        handle.evaluate(&[4]).unwrap();
        assert_eq!(op.cache_len(), 1);
        assert!(op.ptr_eq(&handle));
    }

    #[test]
    fn test_constant_ignores_arguments() {
        let c = Operation::constant(7u32);
        assert_eq!(c.arity(), 0);
        assert_eq!(c.evaluate(&[]).unwrap(), 7);
        assert_eq!(c.evaluate(&[1, 2, 3]).unwrap(), 7);
    }

    #[test]
    fn test_function_checks_argument_count() {
        let err = add_mod(5).evaluate(&[1]).unwrap_err();
        assert!(matches!(err, DnnError::ArityMismatch { expected: 2, actual: 1, .. }));
        assert!(Operation::<u32>::new(0, |_| 0, true).is_err());
    }

    #[test]
    fn test_compose_binary_with_projections() {
        // f(p1(x, y, z), p2(x, y, z)) = (y + z) mod 5
        let f = add_mod(5);
        let g = f
            .compose(&[Operation::projection(3, 1).unwrap(), Operation::projection(3, 2).unwrap()])
            .unwrap();
        assert_eq!(g.arity(), 3);
        assert!(!g.is_cached());
        assert_eq!(g.evaluate(&[9, 3, 4]).unwrap(), 2);
    }

    #[test]
    fn test_compose_uses_constituent_caches() {
        let square = Operation::new(1, |x: &[u32]| x[0] * x[0], true).unwrap();
        let doubled = add_mod(1000).compose(&[square.clone(), square.clone()]).unwrap();
        assert_eq!(doubled.evaluate(&[3]).unwrap(), 18);
        assert_eq!(square.cache_len(), 1);
    }

    #[test]
    fn test_compose_count_mismatch() {
        let ternary = Operation::new(3, |x: &[u32]| x[0] + x[1] + x[2], false).unwrap();
        let err = ternary.compose(&[add_mod(5), add_mod(7)]).unwrap_err();
        assert!(matches!(err, DnnError::ArityMismatch { expected: 3, actual: 2, .. }));
    }

    #[test]
    fn test_compose_mixed_arities() {
        let err = add_mod(5).compose(&[Operation::identity(), add_mod(5)]).unwrap_err();
        assert!(matches!(err, DnnError::ArityMismatch { expected: 1, actual: 2, .. }));
    }

    #[test]
    fn test_compose_nullary_is_evaluated_eagerly() {
        let sum = add_mod(5).compose(&[Operation::constant(3), Operation::constant(4)]).unwrap();
        assert_eq!(sum.arity(), 0);
        assert!(matches!(sum.kernel(), Kernel::Constant(2)));

        let c = Operation::constant(1u32);
        let same = c.compose(&[]).unwrap();
        assert_eq!(same.evaluate(&[]).unwrap(), 1);
    }

    #[rstest]
    #[case(3, 0, Some(10))]
    #[case(3, 2, Some(30))]
    #[case(3, 3, None)]
    fn test_projection(#[case] arity: usize, #[case] coordinate: usize, #[case] expected: Option<u32>) {
        match Operation::projection(arity, coordinate) {
            Ok(p) => assert_eq!(p.evaluate(&[10, 20, 30]).ok(), expected),
            Err(_) => assert!(expected.is_none()),
        }
    }

    #[test]
    fn test_constant_function_has_positive_arity() {
        let c = Operation::constant_function(4u32, 2).unwrap();
        assert_eq!(c.arity(), 2);
        assert_eq!(c.evaluate(&[0, 1]).unwrap(), 4);
        assert_eq!(Operation::<u32>::identity().evaluate(&[8]).unwrap(), 8);
    }
}
