#[doc(hidden)]
pub use futures_signals::map_ref;

/// Combine reactive cells into one signal of cloned value tuples.
///
/// The signal yields the current values once when first polled and again
/// after every `set` on any of the cells.
///
/// ```
/// use futures_signals::signal::Mutable;
/// use rxasync::watch_inputs;
///
/// let url = Mutable::new("http://localhost".to_string());
/// let page = Mutable::new(1u32);
/// let _inputs = watch_inputs!(url, page);
/// ```
#[macro_export]
macro_rules! watch_inputs {
    (@bind [$($name:ident = $signal:expr;)+]) => {
        $crate::macros::map_ref! {
            $(let $name = $signal),+ => ($($name.clone(),)+)
        }
    };

    // 逐个绑定信号，每一层展开都生成一个独立的 `input` 标识符
    (@bind [$($name:ident = $signal:expr;)*] $cell:expr $(, $rest:expr)*) => {
        $crate::watch_inputs!(@bind
            [$($name = $signal;)* input = $cell.signal_cloned();]
            $($rest),*
        )
    };

    ($($cell:expr),+ $(,)?) => {
        $crate::watch_inputs!(@bind [] $($cell),+)
    };
}
