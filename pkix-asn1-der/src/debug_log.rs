#[cfg(not(feature = "debug_log"))]
macro_rules! debug_log {
    () => {};
    ($($arg:tt)*) => {};
}

#[cfg(feature = "debug_log")]
#[macro_use]
pub mod internal {
    use lazy_static::lazy_static;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::thread::ThreadId;

    lazy_static! {
        pub static ref CTX: Mutex<HashMap<ThreadId, u8>> = Mutex::new(HashMap::new());
    }

    /// Nesting depth of the current thread while decoding constructed values.
    pub fn depth() -> u8 {
        CTX.lock()
            .ok()
            .and_then(|ctx| ctx.get(&::std::thread::current().id()).copied())
            .unwrap_or(0)
    }

    /// Increments the current thread depth until dropped.
    pub struct Indenter;

    impl Indenter {
        pub fn indent() -> Indenter {
            if let Ok(mut ctx) = CTX.lock() {
                ctx.entry(::std::thread::current().id())
                    .and_modify(|c| *c = c.saturating_add(1))
                    .or_insert(1);
            }
            Self
        }
    }

    impl Drop for Indenter {
        fn drop(&mut self) {
            if let Ok(mut ctx) = CTX.lock() {
                ctx.entry(::std::thread::current().id())
                    .and_modify(|c| *c = c.saturating_sub(1));
            }
        }
    }

    macro_rules! debug_log {
        () => {
            log::trace!(target: "pkix_asn1_der", "|");
        };
        ($($arg:tt)*) => {
            let indent = $crate::debug_log::internal::depth();
            log::trace!(
                target: "pkix_asn1_der",
                "{}{}",
                "| ".repeat(usize::from(indent)),
                format_args!($($arg)*)
            );
            let _indenter = $crate::debug_log::internal::Indenter::indent();
        };
    }
}
