use std::mem;

/// A destructor bound to a list at construction.
pub(crate) type Destructor<T> = Box<dyn Fn(T) + Send + Sync>;

/// The list's half of the two-tier destructor policy: an optional default destructor, which a
/// destructor supplied at a call site takes precedence over.
pub(crate) struct Destructors<T> {
    default: Option<Destructor<T>>,
}

impl<T> Destructors<T> {
    pub const fn none() -> Destructors<T> {
        Destructors { default: None }
    }

    pub fn with_default<F: Fn(T) + Send + Sync + 'static>(destructor: F) -> Destructors<T> {
        Destructors {
            default: Some(Box::new(destructor)),
        }
    }

    pub const fn has_default(&self) -> bool {
        self.default.is_some()
    }

    /// Destroys `value` with `overriding` if given, otherwise with the default. When there is
    /// neither, the value is forgotten: ownership stays with whoever placed it in the list.
    pub fn dispose(&self, value: T, overriding: Option<&dyn Fn(T)>) {
        match (overriding, &self.default) {
            (Some(destructor), _) => destructor(value),
            (None, Some(destructor)) => destructor(value),
            (None, None) => mem::forget(value),
        }
    }
}
