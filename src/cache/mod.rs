//! Equality-gated derived values.
//!
//! An [`EqualityGatedCache`] is fed one candidate per upstream recomputation
//! and only swaps its published `Rc` when the candidate differs from the
//! current value. Downstream consumers compare by pointer (`Rc::ptr_eq`), so
//! a structurally identical recomputation causes no churn.
//!
//! Gating is opt-in per use site through a [`CacheOption`].

use std::fmt;
use std::rc::Rc;

/// Custom equality used instead of `PartialEq`.
pub type Comparator<T> = Rc<dyn Fn(&T, &T) -> bool>;

/// Object form of a cache option.
pub struct CacheConfig<T> {
    /// `Some(false)` disables gating; anything else enables it.
    pub enabled: Option<bool>,
    /// Replaces structural equality when set.
    pub compare: Option<Comparator<T>>,
}

impl<T> Default for CacheConfig<T> {
    fn default() -> Self {
        Self {
            enabled: None,
            compare: None,
        }
    }
}

impl<T> Clone for CacheConfig<T> {
    fn clone(&self) -> Self {
        Self {
            enabled: self.enabled,
            compare: self.compare.clone(),
        }
    }
}

/// Caller-supplied cache setting (`cache` / `dataCache` options).
pub enum CacheOption<T> {
    /// Nothing configured: passthrough.
    Unset,
    /// `true` enables structural gating, `false` is passthrough.
    Flag(bool),
    /// Explicit configuration.
    Config(CacheConfig<T>),
}

impl<T> CacheOption<T> {
    /// Gating enabled with a custom comparator.
    pub fn compare_with(compare: impl Fn(&T, &T) -> bool + 'static) -> Self {
        CacheOption::Config(CacheConfig {
            enabled: None,
            compare: Some(Rc::new(compare)),
        })
    }

    /// Effective configuration.
    pub fn resolve(&self) -> ResolvedCacheConfig<T> {
        match self {
            CacheOption::Flag(true) => ResolvedCacheConfig {
                enabled: true,
                compare: None,
            },
            CacheOption::Config(config) => ResolvedCacheConfig {
                enabled: config.enabled != Some(false),
                compare: config.compare.clone(),
            },
            CacheOption::Flag(false) | CacheOption::Unset => ResolvedCacheConfig {
                enabled: false,
                compare: None,
            },
        }
    }
}

impl<T> Default for CacheOption<T> {
    fn default() -> Self {
        CacheOption::Unset
    }
}

impl<T> Clone for CacheOption<T> {
    fn clone(&self) -> Self {
        match self {
            CacheOption::Unset => CacheOption::Unset,
            CacheOption::Flag(flag) => CacheOption::Flag(*flag),
            CacheOption::Config(config) => CacheOption::Config(config.clone()),
        }
    }
}

impl<T> From<bool> for CacheOption<T> {
    fn from(flag: bool) -> Self {
        CacheOption::Flag(flag)
    }
}

impl<T> fmt::Debug for CacheOption<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheOption::Unset => f.write_str("Unset"),
            CacheOption::Flag(flag) => f.debug_tuple("Flag").field(flag).finish(),
            CacheOption::Config(config) => f
                .debug_struct("Config")
                .field("enabled", &config.enabled)
                .field("custom_compare", &config.compare.is_some())
                .finish(),
        }
    }
}

/// A [`CacheOption`] reduced to what the cache needs.
pub struct ResolvedCacheConfig<T> {
    /// Whether candidates are gated.
    pub enabled: bool,
    /// Custom comparator, `PartialEq` when `None`.
    pub compare: Option<Comparator<T>>,
}

// ===== EqualityGatedCache =====

/// Holds a derived value and replaces it only when a new candidate differs.
pub struct EqualityGatedCache<T> {
    latest: Rc<T>,
    current: Rc<T>,
    config: ResolvedCacheConfig<T>,
}

impl<T: PartialEq> EqualityGatedCache<T> {
    /// Cache seeded with `initial`.
    pub fn new(initial: T, option: &CacheOption<T>) -> Self {
        let initial = Rc::new(initial);
        Self {
            latest: Rc::clone(&initial),
            current: initial,
            config: option.resolve(),
        }
    }

    /// Published value.
    pub fn current(&self) -> Rc<T> {
        Rc::clone(&self.current)
    }

    /// Whether gating is enabled.
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Feed a freshly computed candidate. Returns whether the published value
    /// was replaced.
    pub fn offer(&mut self, candidate: T) -> bool {
        self.offer_shared(Rc::new(candidate))
    }

    /// Feed a candidate that is already shared.
    pub fn offer_shared(&mut self, candidate: Rc<T>) -> bool {
        self.latest = candidate;
        self.gate()
    }

    /// Change the cache option; the latest candidate is re-gated under it.
    pub fn reconfigure(&mut self, option: &CacheOption<T>) -> bool {
        self.config = option.resolve();
        self.gate()
    }

    fn gate(&mut self) -> bool {
        if Rc::ptr_eq(&self.current, &self.latest) {
            return false;
        }
        if self.config.enabled && self.same(&self.current, &self.latest) {
            return false;
        }
        self.current = Rc::clone(&self.latest);
        true
    }

    fn same(&self, current: &T, candidate: &T) -> bool {
        match &self.config.compare {
            Some(compare) => compare(current, candidate),
            None => current == candidate,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for EqualityGatedCache<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EqualityGatedCache")
            .field("current", &self.current)
            .field("enabled", &self.config.enabled)
            .finish()
    }
}
