//! Integration tests driving the hapbal binary end to end.

mod helpers;
mod test_balance_command;
mod test_merge_command;
mod test_phase_command;
