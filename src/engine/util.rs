use chrono::NaiveDate;

/// Itère la plage inclusive [start, end] jour par jour.
pub(super) fn days_inclusive(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    std::iter::successors(Some(start), move |d| {
        d.succ_opt().filter(|next| *next <= end)
    })
}
