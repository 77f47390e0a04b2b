/// The observable triple of one [`AsyncStateHandle`](crate::AsyncStateHandle).
///
/// A snapshot is always published as a whole, so a consumer never sees
/// `data` and `error` from two different attempts side by side.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct AsyncSnapshot<T, E> {
    pub is_loading: bool,
    pub data: Option<T>,
    pub error: Option<E>,
}

impl<T, E> AsyncSnapshot<T, E> {
    /// Nothing has run yet.
    pub fn uninitialized() -> Self {
        AsyncSnapshot {
            is_loading: false,
            data: None,
            error: None,
        }
    }

    pub fn success(data: T) -> Self {
        AsyncSnapshot {
            is_loading: false,
            data: Some(data),
            error: None,
        }
    }

    pub fn fail(error: E) -> Self {
        AsyncSnapshot {
            is_loading: false,
            data: None,
            error: Some(error),
        }
    }

    pub fn settle(result: Result<T, E>) -> Self {
        match result {
            Ok(data) => AsyncSnapshot::success(data),
            Err(error) => AsyncSnapshot::fail(error),
        }
    }

    /// Enter the loading state. With `retain` the last settled values stay
    /// visible until the new attempt settles.
    pub fn begin_loading(&mut self, retain: bool) {
        self.is_loading = true;
        if !retain {
            self.data = None;
            self.error = None;
        }
    }

    /// Leave the loading state without touching the settled values.
    pub fn end_loading(&mut self) {
        self.is_loading = false;
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn is_success(&self) -> bool {
        !self.is_loading && self.data.is_some()
    }

    pub fn is_fail(&self) -> bool {
        !self.is_loading && self.error.is_some()
    }

    /// Not loading and holding exactly one outcome.
    pub fn is_complete(&self) -> bool {
        self.is_success() || self.is_fail()
    }

    pub fn data_ref(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn error_ref(&self) -> Option<&E> {
        self.error.as_ref()
    }
}

impl<T, E> Default for AsyncSnapshot<T, E> {
    fn default() -> Self {
        AsyncSnapshot::uninitialized()
    }
}

impl<T, E> From<Result<T, E>> for AsyncSnapshot<T, E> {
    fn from(value: Result<T, E>) -> Self {
        AsyncSnapshot::settle(value)
    }
}
