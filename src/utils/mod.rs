pub(crate) mod date;
pub(crate) mod duration;
pub(crate) mod timezone;

pub(crate) use date::{parse_date, parse_timestamp};
pub(crate) use duration::{format_duration, format_gap, hours};
pub(crate) use timezone::Timezone;
