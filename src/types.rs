//! Type-safe wrappers for variables and literals.
//!
//! Variables are 1-indexed (DIMACS style), literals are signed variables
//! whose sign encodes polarity.
use std::fmt;
use std::ops::Neg;

/// A variable identifier (1-indexed).
///
/// # Invariants
///
/// - Variable IDs must be >= 1 (0 is not a variable)
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Var(u32);

impl Var {
    /// Creates a new variable with the given ID.
    ///
    /// # Panics
    ///
    /// Panics if `id == 0` (variables are 1-indexed) or if `id` does not fit
    /// into a literal (`id > i32::MAX`).
    pub fn new(id: u32) -> Self {
        assert_ne!(id, 0, "Variable IDs must be >= 1");
        assert!(id <= i32::MAX as u32, "Variable IDs must be <= i32::MAX");
        Var(id)
    }

    /// Returns the raw variable ID as a `u32`.
    pub fn id(self) -> u32 {
        self.0
    }

    /// Returns the 0-based position of this variable inside a configuration.
    pub fn index(self) -> usize {
        (self.0 - 1) as usize
    }

    /// Positive literal of this variable.
    pub fn pos(self) -> Lit {
        Lit(self.0 as i32)
    }

    /// Negative literal of this variable.
    pub fn neg(self) -> Lit {
        Lit(-(self.0 as i32))
    }
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x{}", self.0)
    }
}

impl From<Var> for u32 {
    fn from(var: Var) -> Self {
        var.0
    }
}

/// A literal: a variable together with a polarity.
///
/// The ordering is the ordering of the signed DIMACS integers, which is what
/// makes sorted literal arrays canonical.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Lit(i32);

impl Lit {
    /// Creates a literal from its DIMACS representation.
    ///
    /// # Panics
    ///
    /// Panics if `lit == 0` or `lit == i32::MIN` (whose variable does not fit
    /// into a literal).
    pub fn from_dimacs(lit: i32) -> Self {
        assert_ne!(lit, 0, "Literal 0 is invalid");
        assert_ne!(lit, i32::MIN, "Literal i32::MIN is out of range");
        Lit(lit)
    }

    /// Creates a literal from its DIMACS representation, or `None` for 0 and
    /// `i32::MIN`.
    pub fn try_from_dimacs(lit: i32) -> Option<Self> {
        if lit == 0 || lit == i32::MIN {
            None
        } else {
            Some(Lit(lit))
        }
    }

    /// Returns the signed DIMACS integer.
    pub fn to_dimacs(self) -> i32 {
        self.0
    }

    /// Returns the underlying variable.
    pub fn var(self) -> Var {
        Var(self.0.unsigned_abs())
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Flips the polarity in place.
    #[inline]
    pub fn flip(&mut self) {
        self.0 = -self.0;
    }
}

impl Neg for Lit {
    type Output = Lit;

    fn neg(self) -> Self::Output {
        Lit(-self.0)
    }
}

impl From<i32> for Lit {
    fn from(lit: i32) -> Self {
        Lit::from_dimacs(lit)
    }
}

impl fmt::Display for Lit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_negative() {
            write!(f, "~{}", self.var())
        } else {
            write!(f, "{}", self.var())
        }
    }
}
