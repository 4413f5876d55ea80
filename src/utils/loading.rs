use std::sync::atomic::{AtomicBool, Ordering};

type Listener = Box<dyn Fn(bool) + Send + Sync>;

/// Flag `isLoading` de um provider.
///
/// Cada operação liga o flag ao começar e desliga ao terminar, sem contagem de
/// chamadas concorrentes: com duas operações em voo, a primeira que termina
/// desliga o flag (último a escrever vence).
pub struct LoadingFlag {
    busy: AtomicBool,
    listener: Option<Listener>,
}

impl LoadingFlag {
    pub fn new() -> Self {
        Self { busy: AtomicBool::new(false), listener: None }
    }

    pub fn with_listener<F>(listener: F) -> Self
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        Self { busy: AtomicBool::new(false), listener: Some(Box::new(listener)) }
    }

    pub fn is_loading(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Liga o flag; o guard desliga no drop, inclusive em caminho de erro.
    pub fn begin(&self) -> LoadingGuard<'_> {
        self.set(true);
        LoadingGuard { flag: self }
    }

    fn set(&self, busy: bool) {
        let previous = self.busy.swap(busy, Ordering::SeqCst);
        if previous != busy {
            if let Some(listener) = &self.listener {
                listener(busy);
            }
        }
    }
}

impl Default for LoadingFlag {
    fn default() -> Self {
        Self::new()
    }
}

pub struct LoadingGuard<'a> {
    flag: &'a LoadingFlag,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.flag.set(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_guard_resets_flag() {
        let flag = LoadingFlag::new();
        {
            let _guard = flag.begin();
            assert!(flag.is_loading());
        }
        assert!(!flag.is_loading());
    }

    #[test]
    fn test_guard_resets_on_early_return() {
        fn failing(flag: &LoadingFlag) -> Result<(), String> {
            let _guard = flag.begin();
            Err("boom".to_string())
        }

        let flag = LoadingFlag::new();
        assert!(failing(&flag).is_err());
        assert!(!flag.is_loading());
    }

    #[test]
    fn test_overlapping_guards_last_writer_wins() {
        let flag = LoadingFlag::new();
        let first = flag.begin();
        let second = flag.begin();
        drop(first);
        // Segunda operação ainda em voo, mas o flag já foi desligado
        assert!(!flag.is_loading());
        drop(second);
        assert!(!flag.is_loading());
    }

    #[test]
    fn test_listener_sees_transitions_only() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let flag = LoadingFlag::with_listener(move |busy| sink.lock().unwrap().push(busy));

        {
            let _a = flag.begin();
            let _b = flag.begin();
        }

        assert_eq!(*seen.lock().unwrap(), vec![true, false]);
    }
}
