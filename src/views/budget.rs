use crate::{models::budget::BudgetEntry, views::ViewModel};

/// Read-only: `BudgetEntry` is neither `Creatable` nor `Removable`.
pub type BudgetView<S> = ViewModel<BudgetEntry, S>;
