//! Activity window evaluation.

use chrono::NaiveDate;

use crate::models::PromoCode;

/// A code is active when it has capacity left and `today` falls inside its
/// date window. Both window bounds are inclusive and independently optional.
pub fn is_active(code: &PromoCode, today: NaiveDate) -> bool {
    code.redemption.has_capacity() && in_window(code.active_from, code.active_until, today)
}

pub fn in_window(from: Option<NaiveDate>, until: Option<NaiveDate>, today: NaiveDate) -> bool {
    let after_start = from.map_or(true, |f| today >= f);
    let before_end = until.map_or(true, |u| today <= u);
    after_start && before_end
}
