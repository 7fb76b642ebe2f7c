/// One-shot "generation finished" signal.
///
/// Subscribers that arrive after the signal fired are called immediately with
/// the stored value. [`reset`](Self::reset) starts a new run and keeps
/// subscribers that have not been called yet.
pub struct CompletionSignal<T> {
    value: Option<T>,
    pending: Vec<Box<dyn FnOnce(&T)>>,
}

impl<T> Default for CompletionSignal<T> {
    fn default() -> Self {
        Self {
            value: None,
            pending: Vec::new(),
        }
    }
}

impl<T> CompletionSignal<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, f: impl FnOnce(&T) + 'static) {
        match &self.value {
            Some(v) => f(v),
            None => self.pending.push(Box::new(f)),
        }
    }

    /// Fire once; later calls are ignored and return false.
    pub fn fire(&mut self, value: T) -> bool {
        if self.value.is_some() {
            return false;
        }
        let v = self.value.insert(value);
        for f in self.pending.drain(..) {
            f(v);
        }
        true
    }

    #[inline]
    pub fn is_fired(&self) -> bool {
        self.value.is_some()
    }

    #[inline]
    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn reset(&mut self) {
        self.value = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn early_and_late_subscribers_fire_once() {
        let hits = Rc::new(Cell::new(0));
        let mut s = CompletionSignal::new();
        let h = hits.clone();
        s.subscribe(move |v: &u32| h.set(h.get() + *v));
        assert_eq!(hits.get(), 0);
        assert!(s.fire(5));
        assert_eq!(hits.get(), 5);
        assert!(!s.fire(7));
        let h = hits.clone();
        s.subscribe(move |v| h.set(h.get() + *v));
        assert_eq!(hits.get(), 10);
        assert_eq!(s.pending(), 0);
    }

    #[test]
    fn reset_keeps_waiting_subscribers() {
        let hits = Rc::new(Cell::new(0));
        let mut s = CompletionSignal::new();
        s.fire(1);
        s.reset();
        let h = hits.clone();
        s.subscribe(move |v: &i32| h.set(*v));
        s.reset();
        assert_eq!(s.pending(), 1);
        s.fire(3);
        assert_eq!(hits.get(), 3);
    }
}
