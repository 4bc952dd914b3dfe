//! 上下文变量
//! Context variables
//!
//! The key/value bag shared by every function of one pipeline run.

use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// Name of the conventional main variable.
pub const INPUT_VARIABLE: &str = "input";

/// Insertion-ordered, case-sensitive `name -> value` map shared by reference.
///
/// Cloning a `ContextVariables` clones the *handle*: both clones read and
/// write the same variables. Use [`snapshot`](Self::snapshot) for an
/// independent copy. Every single-key read or write is atomic; use
/// [`update`](Self::update) for read-modify-write on one key.
///
/// # Example
///
/// ```rust,ignore
/// use weft_kernel::function::ContextVariables;
///
/// let vars = ContextVariables::with_input("What is the capital of France?");
/// vars.set("collection", "facts");
///
/// let shared = vars.clone();
/// shared.set("answer", "Paris");
/// assert_eq!(vars.get("answer").as_deref(), Some("Paris"));
/// ```
#[derive(Clone, Default)]
pub struct ContextVariables {
    entries: Arc<RwLock<Vec<(String, String)>>>,
}

impl ContextVariables {
    /// 创建空变量集
    /// Create an empty variable set
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a variable set whose `input` variable is `input`
    pub fn with_input(input: impl Into<String>) -> Self {
        let vars = Self::new();
        vars.set(INPUT_VARIABLE, input);
        vars
    }

    /// 获取变量
    /// Get a variable
    pub fn get(&self, name: &str) -> Option<String> {
        self.entries
            .read()
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.clone())
    }

    /// 设置变量，返回旧值
    /// Set a variable, returning the previous value
    ///
    /// New names are appended; existing names keep their position.
    pub fn set(&self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let name = name.into();
        let value = value.into();
        let mut entries = self.entries.write();
        match entries.iter_mut().find(|(key, _)| *key == name) {
            Some((_, existing)) => Some(std::mem::replace(existing, value)),
            None => {
                entries.push((name, value));
                None
            }
        }
    }

    /// Atomically replace `name` with `f(current value)`, returning the new value
    pub fn update<F>(&self, name: &str, f: F) -> String
    where
        F: FnOnce(Option<&str>) -> String,
    {
        let mut entries = self.entries.write();
        match entries.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => {
                *existing = f(Some(existing.as_str()));
                existing.clone()
            }
            None => {
                let value = f(None);
                entries.push((name.to_string(), value.clone()));
                value
            }
        }
    }

    pub fn remove(&self, name: &str) -> Option<String> {
        let mut entries = self.entries.write();
        let index = entries.iter().position(|(key, _)| key == name)?;
        Some(entries.remove(index).1)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.read().iter().any(|(key, _)| key == name)
    }

    /// Value of the `input` variable
    pub fn input(&self) -> Option<String> {
        self.get(INPUT_VARIABLE)
    }

    pub fn set_input(&self, input: impl Into<String>) -> Option<String> {
        self.set(INPUT_VARIABLE, input)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Variable names in insertion order
    pub fn names(&self) -> Vec<String> {
        self.entries.read().iter().map(|(key, _)| key.clone()).collect()
    }

    /// `(name, value)` pairs in insertion order
    pub fn entries(&self) -> Vec<(String, String)> {
        self.entries.read().clone()
    }

    /// Independent deep copy
    pub fn snapshot(&self) -> Self {
        Self {
            entries: Arc::new(RwLock::new(self.entries())),
        }
    }

    /// Whether two handles share the same variables
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.entries, &other.entries)
    }
}

impl fmt::Debug for ContextVariables {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries()).finish()
    }
}

impl<K, V> FromIterator<(K, V)> for ContextVariables
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let vars = Self::new();
        for (name, value) in iter {
            vars.set(name, value);
        }
        vars
    }
}
