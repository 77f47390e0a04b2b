use futures_signals::signal::Mutable;

/// An argument that is either a fixed value or a reactive cell.
///
/// Constants are wrapped in a private cell, cells are used as-is so that
/// later `set` calls by the caller are observed.
#[derive(Debug, Clone)]
pub enum Input<T> {
    Constant(T),
    Cell(Mutable<T>),
}

impl<T> Input<T> {
    pub fn constant(value: T) -> Self {
        Input::Constant(value)
    }

    pub fn cell(cell: Mutable<T>) -> Self {
        Input::Cell(cell)
    }

    pub fn is_cell(&self) -> bool {
        matches!(self, Input::Cell(_))
    }

    pub fn into_cell(self) -> Mutable<T> {
        match self {
            Input::Constant(value) => Mutable::new(value),
            Input::Cell(cell) => cell,
        }
    }
}

impl<T> From<Mutable<T>> for Input<T> {
    fn from(cell: Mutable<T>) -> Self {
        Input::Cell(cell)
    }
}

impl<T: Default> Default for Input<T> {
    fn default() -> Self {
        Input::Constant(T::default())
    }
}
