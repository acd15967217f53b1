//! Interface for record filters such as coverage or frequency thresholds.

use crate::record::Record;
use crate::types::HeaderFilter;

pub trait Filter {
    /// Short name, also used to activate the filter.
    fn name(&self) -> &str;

    /// Text for the `##FILTER` description.
    fn description(&self) -> &str;

    /// Name written to the FILTER column, e.g. `cov100` for a coverage
    /// threshold of 100.
    fn filter_name(&self) -> String {
        self.name().to_owned()
    }

    /// `None` if the record passes, otherwise the value that triggered the filter.
    fn check(&self, record: &Record) -> Option<String>;

    fn header_filter(&self) -> HeaderFilter {
        HeaderFilter::new(&self.filter_name(), self.description())
    }
}

/// Runs every filter over `record` and attaches the name of each one that
/// triggers. Returns whether any did.
pub fn apply_filters(record: &mut Record, filters: &[Box<dyn Filter>]) -> bool {
    let mut triggered = false;
    for filter in filters {
        if let Some(value) = filter.check(record) {
            log::trace!(
                "{} triggered at {}:{}:{} ({})",
                filter.filter_name(),
                record.chrom(),
                record.gene(),
                record.pos(),
                value
            );
            record.add_filter(&filter.filter_name());
            triggered = true;
        }
    }
    triggered
}
